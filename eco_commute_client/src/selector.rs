use std::{collections::HashMap, sync::Arc};

use eco_commute_lib::{distance_km, Coordinate};
use tokio::sync::Mutex;

use crate::geocoder::{resolve_address, Address, ReverseGeocoder};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointRole {
    Start,
    Destination,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionState {
    Empty,
    OneSelected { start: Coordinate },
    Locked { start: Coordinate, destination: Coordinate },
}

/// A start/destination pair finalized by the second click.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommittedPair {
    pub start: Coordinate,
    pub destination: Coordinate,
    pub distance_km: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClickOutcome {
    StartSelected { cycle: u64, start: Coordinate },
    Committed { cycle: u64, pair: CommittedPair },
    /// The selection is locked until reset.
    Ignored,
}

/// Turns map clicks into one committed pair per lock cycle.
///
/// `Empty -> OneSelected -> Locked`, and `reset` is the only way out of
/// `Locked`. Addresses are filled in later through
/// [`set_address`](Self::set_address), tagged with the cycle they belong to.
#[derive(Debug, Clone, PartialEq)]
pub struct PointSelector {
    state: SelectionState,
    addresses: HashMap<PointRole, Address>,
    distance_km: Option<f64>,
    cycle: u64,
}

impl Default for PointSelector {
    fn default() -> Self {
        Self::new()
    }
}

impl PointSelector {
    pub fn new() -> Self {
        Self {
            state: SelectionState::Empty,
            addresses: HashMap::new(),
            distance_km: None,
            cycle: 0,
        }
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn points(&self) -> Vec<Coordinate> {
        match self.state {
            SelectionState::Empty => Vec::new(),
            SelectionState::OneSelected { start } => vec![start],
            SelectionState::Locked { start, destination } => vec![start, destination],
        }
    }

    pub fn is_locked(&self) -> bool {
        matches!(self.state, SelectionState::Locked { .. })
    }

    pub fn address(&self, role: PointRole) -> Option<&Address> {
        self.addresses.get(&role)
    }

    pub fn distance_km(&self) -> Option<f64> {
        self.distance_km
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn committed(&self) -> Option<CommittedPair> {
        match (self.state, self.distance_km) {
            (SelectionState::Locked { start, destination }, Some(distance_km)) => Some(CommittedPair {
                start,
                destination,
                distance_km,
            }),
            _ => None,
        }
    }

    pub fn click(&mut self, at: Coordinate) -> ClickOutcome {
        match self.state {
            SelectionState::Empty => {
                self.state = SelectionState::OneSelected { start: at };
                self.addresses.insert(PointRole::Start, Address::Loading);
                tracing::debug!("Start point selected at {at}");
                ClickOutcome::StartSelected { cycle: self.cycle, start: at }
            }
            SelectionState::OneSelected { start } => {
                let pair = CommittedPair {
                    start,
                    destination: at,
                    distance_km: distance_km(start, at),
                };
                self.state = SelectionState::Locked { start, destination: at };
                self.distance_km = Some(pair.distance_km);
                self.addresses.insert(PointRole::Start, Address::Loading);
                self.addresses.insert(PointRole::Destination, Address::Loading);
                tracing::info!("Selection locked: {start} -> {at} ({:.2} km)", pair.distance_km);
                ClickOutcome::Committed { cycle: self.cycle, pair }
            }
            SelectionState::Locked { .. } => {
                tracing::debug!("Ignoring click at {at}, selection is locked");
                ClickOutcome::Ignored
            }
        }
    }

    /// Back to `Empty` from `Locked`; any other state is left alone and `false` returned.
    /// Address lookups still in flight for the old cycle are dropped on arrival.
    pub fn reset(&mut self) -> bool {
        if !self.is_locked() {
            tracing::debug!("Ignoring reset, nothing is locked");
            return false;
        }
        self.state = SelectionState::Empty;
        self.addresses.clear();
        self.distance_km = None;
        self.cycle += 1;
        tracing::debug!("Selection reset, cycle {}", self.cycle);
        true
    }

    /// Stores a resolved address if `cycle` is still the current one and the point still exists.
    pub fn set_address(&mut self, cycle: u64, role: PointRole, address: Address) -> bool {
        if cycle != self.cycle {
            return false;
        }
        let has_point = match role {
            PointRole::Start => !matches!(self.state, SelectionState::Empty),
            PointRole::Destination => self.is_locked(),
        };
        if has_point {
            self.addresses.insert(role, address);
        }
        has_point
    }
}

/// Receives `Some(pair)` on commit and `None` on reset.
pub type SelectionCallback = Box<dyn Fn(Option<CommittedPair>) + Send + Sync>;

/// Drives a [`PointSelector`] from click events, resolving addresses in the background
/// of each transition.
pub struct SelectionController {
    selector: Mutex<PointSelector>,
    geocoder: Arc<dyn ReverseGeocoder>,
    on_select: SelectionCallback,
}

impl SelectionController {
    pub fn new(geocoder: Arc<dyn ReverseGeocoder>, on_select: SelectionCallback) -> Self {
        Self {
            selector: Mutex::new(PointSelector::new()),
            geocoder,
            on_select,
        }
    }

    /// Applies the click immediately, then waits for the address lookups it triggered.
    pub async fn click(&self, at: Coordinate) -> ClickOutcome {
        let outcome = self.selector.lock().await.click(at);

        match outcome {
            ClickOutcome::StartSelected { cycle, start } => {
                let address = resolve_address(self.geocoder.as_ref(), start).await;
                self.selector.lock().await.set_address(cycle, PointRole::Start, address);
            }
            ClickOutcome::Committed { cycle, pair } => {
                (self.on_select)(Some(pair));

                let (start, destination) = tokio::join!(
                    resolve_address(self.geocoder.as_ref(), pair.start),
                    resolve_address(self.geocoder.as_ref(), pair.destination),
                );

                let mut selector = self.selector.lock().await;
                selector.set_address(cycle, PointRole::Start, start);
                selector.set_address(cycle, PointRole::Destination, destination);
            }
            ClickOutcome::Ignored => {}
        }

        outcome
    }

    /// Unlocks the selection. Reports `None` only when there was a locked pair to clear.
    pub async fn reset(&self) -> bool {
        let cleared = self.selector.lock().await.reset();
        if cleared {
            (self.on_select)(None);
        }
        cleared
    }

    pub async fn snapshot(&self) -> PointSelector {
        self.selector.lock().await.clone()
    }
}
