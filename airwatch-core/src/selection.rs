use crate::model::LocationId;

/// Proof that a load was started for a particular selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    location: LocationId,
    generation: u64,
}

impl Ticket {
    pub fn location(&self) -> LocationId {
        self.location
    }
}

/// The single "current location", with a generation counter so results from
/// superseded loads can be told apart from the latest one.
#[derive(Debug, Default)]
pub struct Selection {
    current: Option<LocationId>,
    generation: u64,
}

impl Selection {
    pub fn select(&mut self, location: LocationId) -> Ticket {
        self.generation += 1;
        self.current = Some(location);
        Ticket { location, generation: self.generation }
    }

    pub fn current(&self) -> Option<LocationId> {
        self.current
    }

    /// Ticket for the current selection without starting a new generation.
    pub fn ticket(&self) -> Option<Ticket> {
        self.current.map(|location| Ticket { location, generation: self.generation })
    }

    pub fn is_current(&self, ticket: &Ticket) -> bool {
        ticket.generation == self.generation && self.current == Some(ticket.location)
    }
}
