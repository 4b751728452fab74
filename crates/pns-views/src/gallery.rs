/// Horizontal swipe over the image area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    /// Finger moves left: show the next image
    Left,
    /// Finger moves right: show the previous image
    Right,
}

/// Image index of a listing's photo gallery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageGallery {
    images: Vec<String>,
    current: usize,
}

impl ImageGallery {
    pub fn new(images: Vec<String>) -> Self {
        Self { images, current: 0 }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn index(&self) -> usize {
        self.current
    }

    /// Image shown now, `None` for an empty gallery
    pub fn current(&self) -> Option<&str> {
        self.images.get(self.current).map(String::as_str)
    }

    /// Navigation arrows are only shown with more than one image
    pub fn has_navigation(&self) -> bool {
        self.images.len() > 1
    }

    pub fn next(&mut self) {
        if !self.images.is_empty() {
            self.current = (self.current + 1) % self.images.len();
        }
    }

    pub fn previous(&mut self) {
        if !self.images.is_empty() {
            self.current = (self.current + self.images.len() - 1) % self.images.len();
        }
    }

    /// Thumbnail click, clamped to the last image
    pub fn select(&mut self, index: usize) {
        self.current = index.min(self.images.len().saturating_sub(1));
    }

    pub fn swipe(&mut self, direction: SwipeDirection) {
        match direction {
            SwipeDirection::Left => self.next(),
            SwipeDirection::Right => self.previous(),
        }
    }

    /// One-based position, e.g. `"2/5"`
    pub fn counter(&self) -> Option<String> {
        (!self.images.is_empty()).then(|| format!("{}/{}", self.current + 1, self.images.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gallery(count: usize) -> ImageGallery {
        ImageGallery::new((0..count).map(|i| format!("/img/{}.jpg", i)).collect())
    }

    #[test]
    fn test_navigation_wraps() {
        let mut gallery = gallery(3);
        gallery.previous();
        assert_eq!(gallery.current(), Some("/img/2.jpg"));
        gallery.swipe(SwipeDirection::Left);
        assert_eq!(gallery.index(), 0);
        gallery.swipe(SwipeDirection::Right);
        assert_eq!(gallery.counter().as_deref(), Some("3/3"));
    }

    #[test]
    fn test_select_is_clamped() {
        let mut gallery = gallery(4);
        gallery.select(10);
        assert_eq!(gallery.index(), 3);
        assert!(gallery.has_navigation());
    }

    #[test]
    fn test_empty_gallery() {
        let mut gallery = gallery(0);
        gallery.next();
        gallery.previous();
        gallery.select(2);
        assert_eq!(gallery.current(), None);
        assert_eq!(gallery.counter(), None);
        assert!(!gallery.has_navigation());
    }
}
