use tokio::sync::Mutex;

/// Identifies one run against a [`LatestWins`] slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

struct Slot<T> {
    generation: u64,
    value: T,
}

/// Shared view state that only the most recently *started* run may write.
///
/// [`begin`](Self::begin) bumps the generation and hands out a ticket; every
/// later write presents its ticket and is dropped if a newer run has begun
/// since. The generation is compared under the lock that guards the value.
pub struct LatestWins<T> {
    slot: Mutex<Slot<T>>,
}

impl<T: Clone> LatestWins<T> {
    pub fn new(value: T) -> Self {
        Self {
            slot: Mutex::new(Slot { generation: 0, value }),
        }
    }

    /// Starts a new run, invalidating all outstanding tickets, and resets the value.
    pub async fn begin(&self, initial: T) -> Ticket {
        let mut slot = self.slot.lock().await;
        slot.generation += 1;
        slot.value = initial;
        Ticket(slot.generation)
    }

    /// Applies `write` if `ticket` is still current. Returns whether it was applied.
    pub async fn update(&self, ticket: Ticket, write: impl FnOnce(&mut T)) -> bool {
        let mut slot = self.slot.lock().await;
        if slot.generation != ticket.0 {
            tracing::debug!("Dropping stale write from run {} (current {})", ticket.0, slot.generation);
            return false;
        }
        write(&mut slot.value);
        true
    }

    pub async fn snapshot(&self) -> T {
        self.slot.lock().await.value.clone()
    }
}

impl<T: Clone + Default> Default for LatestWins<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
