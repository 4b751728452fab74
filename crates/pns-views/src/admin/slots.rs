use pns_core::ListingId;

use super::AdminError;

/// Number of featured link slots on the storefront
pub const FEATURED_SLOT_COUNT: u32 = 12;

/// Whether a slot holds a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotStatus {
    Available,
    Occupied(ListingId),
}

/// Visit and chat counters of a slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotStats {
    pub visits_24h: u64,
    pub total_visits: u64,
    pub chats_24h: u64,
    pub total_chats: u64,
}

impl SlotStats {
    /// Chats started per visit over the last 24 hours, in percent
    pub fn chat_rate_24h(&self) -> f64 {
        if self.visits_24h == 0 {
            0.0
        } else {
            self.chats_24h as f64 * 100.0 / self.visits_24h as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSlot {
    /// One-based slot number
    pub number: u32,
    pub status: SlotStatus,
    /// Price of the slot in FCFA
    pub price: u64,
    pub stats: SlotStats,
}

impl LinkSlot {
    pub fn listing_id(&self) -> Option<&str> {
        match &self.status {
            SlotStatus::Available => None,
            SlotStatus::Occupied(id) => Some(id.as_str()),
        }
    }

    pub fn is_available(&self) -> bool {
        self.status == SlotStatus::Available
    }
}

/// The featured slots, numbered from 1
pub struct LinkSlotBoard {
    slots: Vec<LinkSlot>,
}

impl LinkSlotBoard {
    /// `count` empty slots, all at `price`
    pub fn new(count: u32, price: u64) -> Self {
        let slots = (1..=count)
            .map(|number| LinkSlot {
                number,
                status: SlotStatus::Available,
                price,
                stats: SlotStats::default(),
            })
            .collect();
        Self { slots }
    }

    pub fn slots(&self) -> &[LinkSlot] {
        &self.slots
    }

    pub fn get(&self, number: u32) -> Option<&LinkSlot> {
        let index = number.checked_sub(1)?;
        self.slots.get(index as usize)
    }

    pub fn occupied_count(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_available()).count()
    }

    pub fn available_count(&self) -> usize {
        self.slots.len() - self.occupied_count()
    }

    /// Slot currently holding `listing_id`
    pub fn slot_of(&self, listing_id: &str) -> Option<u32> {
        self.slots
            .iter()
            .find(|s| s.listing_id() == Some(listing_id))
            .map(|s| s.number)
    }

    /// Put a listing into a specific slot
    pub fn assign(&mut self, number: u32, listing_id: impl Into<ListingId>) -> Result<(), AdminError> {
        let listing_id = listing_id.into();
        if let Some(slot) = self.slot_of(&listing_id) {
            return Err(AdminError::AlreadyAssigned { slot, listing_id });
        }

        let slot = self.slot_mut(number)?;
        if let SlotStatus::Occupied(current) = &slot.status {
            return Err(AdminError::SlotOccupied {
                slot: number,
                listing_id: current.clone(),
            });
        }

        tracing::info!(slot = number, listing = %listing_id, "Slot assigned");
        slot.status = SlotStatus::Occupied(listing_id);
        slot.stats = SlotStats::default();
        Ok(())
    }

    /// Put a listing into the lowest-numbered free slot
    pub fn assign_first_free(&mut self, listing_id: impl Into<ListingId>) -> Result<u32, AdminError> {
        let number = self
            .slots
            .iter()
            .find(|s| s.is_available())
            .map(|s| s.number)
            .ok_or(AdminError::NoFreeSlot)?;
        self.assign(number, listing_id)?;
        Ok(number)
    }

    /// Free a slot, returning the listing it held
    pub fn release(&mut self, number: u32) -> Result<Option<ListingId>, AdminError> {
        let slot = self.slot_mut(number)?;
        match std::mem::replace(&mut slot.status, SlotStatus::Available) {
            SlotStatus::Available => Ok(None),
            SlotStatus::Occupied(listing_id) => {
                tracing::info!(slot = number, listing = %listing_id, "Slot released");
                Ok(Some(listing_id))
            }
        }
    }

    pub fn record_visit(&mut self, number: u32) -> Result<(), AdminError> {
        let stats = &mut self.slot_mut(number)?.stats;
        stats.visits_24h += 1;
        stats.total_visits += 1;
        Ok(())
    }

    pub fn record_chat(&mut self, number: u32) -> Result<(), AdminError> {
        let stats = &mut self.slot_mut(number)?.stats;
        stats.chats_24h += 1;
        stats.total_chats += 1;
        Ok(())
    }

    /// Start a new 24 hour window
    pub fn reset_daily_stats(&mut self) {
        for slot in &mut self.slots {
            slot.stats.visits_24h = 0;
            slot.stats.chats_24h = 0;
        }
    }

    fn slot_mut(&mut self, number: u32) -> Result<&mut LinkSlot, AdminError> {
        number
            .checked_sub(1)
            .and_then(|index| self.slots.get_mut(index as usize))
            .ok_or(AdminError::NoSuchSlot(number))
    }
}

impl Default for LinkSlotBoard {
    fn default() -> Self {
        Self::new(FEATURED_SLOT_COUNT, 500)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_and_release() {
        let mut board = LinkSlotBoard::default();
        assert_eq!(board.slots().len(), 12);
        assert_eq!(board.available_count(), 12);

        board.assign(3, "a").unwrap();
        assert_eq!(board.assign_first_free("b"), Ok(1));
        assert_eq!(board.assign_first_free("c"), Ok(2));
        assert_eq!(board.assign_first_free("d"), Ok(4));
        assert_eq!(board.occupied_count(), 4);
        assert_eq!(board.slot_of("a"), Some(3));

        assert_eq!(board.release(3), Ok(Some("a".to_string())));
        assert_eq!(board.release(3), Ok(None));
        assert!(board.get(3).unwrap().is_available());
    }

    #[test]
    fn test_assignment_errors() {
        let mut board = LinkSlotBoard::new(2, 500);
        board.assign(1, "a").unwrap();

        assert_eq!(
            board.assign(1, "b"),
            Err(AdminError::SlotOccupied {
                slot: 1,
                listing_id: "a".to_string()
            })
        );
        assert_eq!(
            board.assign(2, "a"),
            Err(AdminError::AlreadyAssigned {
                slot: 1,
                listing_id: "a".to_string()
            })
        );
        assert_eq!(board.assign(0, "b"), Err(AdminError::NoSuchSlot(0)));
        assert_eq!(board.assign(13, "b"), Err(AdminError::NoSuchSlot(13)));

        board.assign(2, "b").unwrap();
        assert_eq!(board.assign_first_free("c"), Err(AdminError::NoFreeSlot));
        assert_eq!(board.get(0), None);
    }

    #[test]
    fn test_stats() {
        let mut board = LinkSlotBoard::default();
        board.assign(5, "a").unwrap();
        for _ in 0..20 {
            board.record_visit(5).unwrap();
        }
        board.record_chat(5).unwrap();
        let stats = board.get(5).unwrap().stats;
        assert_eq!(stats.total_visits, 20);
        assert!((stats.chat_rate_24h() - 5.0).abs() < f64::EPSILON);

        board.reset_daily_stats();
        let stats = board.get(5).unwrap().stats;
        assert_eq!(stats.visits_24h, 0);
        assert_eq!(stats.total_chats, 1);
        assert_eq!(board.record_visit(99), Err(AdminError::NoSuchSlot(99)));
    }
}
