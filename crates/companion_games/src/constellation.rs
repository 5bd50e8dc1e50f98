//! Connect the stars in numbered order.

use crate::error::MoveError;
use crate::status::{Engine, Status};
use derive_new::new;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// A labelled point on the star map, in percent of the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, new)]
pub struct Star {
    /// 1-based id; stars connect in id order.
    pub id: u32,
    /// Horizontal position.
    pub x: f32,
    /// Vertical position.
    pub y: f32,
}

/// A line drawn between two connected stars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start point.
    pub from: (f32, f32),
    /// End point.
    pub to: (f32, f32),
}

/// Name and stars of the bundled constellation.
pub fn great_bear() -> (&'static str, Vec<Star>) {
    (
        "The Great Bear",
        vec![
            Star::new(1, 10.0, 50.0),
            Star::new(2, 25.0, 45.0),
            Star::new(3, 40.0, 55.0),
            Star::new(4, 55.0, 50.0),
            Star::new(5, 70.0, 30.0),
            Star::new(6, 85.0, 20.0),
            Star::new(7, 65.0, 65.0),
        ],
    )
}

/// Constellation engine.
#[derive(Debug, Clone)]
pub struct Constellation {
    name: String,
    stars: Vec<Star>,
    connected: Vec<u32>,
}

impl Constellation {
    /// Starts the bundled constellation.
    pub fn great_bear() -> Self {
        let (name, stars) = great_bear();
        Self::new(name, stars)
    }

    /// Starts a custom star map; stars are ordered by id.
    #[instrument(skip(stars))]
    pub fn new(name: impl Into<String> + std::fmt::Debug, mut stars: Vec<Star>) -> Self {
        stars.sort_by_key(|s| s.id);
        Self {
            name: name.into(),
            stars,
            connected: Vec::new(),
        }
    }

    /// Constellation name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All stars.
    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    /// Ids connected so far, in order.
    pub fn connected(&self) -> &[u32] {
        &self.connected
    }

    /// Id that the next selection must match.
    pub fn next_id(&self) -> u32 {
        self.connected.last().map_or(1, |last| last + 1)
    }

    /// Connects a star if it is next in sequence.
    #[instrument(skip(self))]
    pub fn select_point(&mut self, id: u32) -> Result<(), MoveError> {
        if self.is_over() {
            return Err(MoveError::GameOver);
        }
        let expected = self.next_id();
        if id != expected {
            return Err(MoveError::OutOfOrder { got: id, expected });
        }
        self.connected.push(id);
        debug!(id, "Star connected");
        if self.is_over() {
            info!(name = %self.name, "Constellation complete");
        }
        Ok(())
    }

    /// Polyline through the connected stars.
    pub fn segments(&self) -> Vec<Segment> {
        let points: Vec<(f32, f32)> = self
            .connected
            .iter()
            .filter_map(|id| self.stars.iter().find(|s| s.id == *id))
            .map(|s| (s.x, s.y))
            .collect();
        points
            .windows(2)
            .map(|pair| Segment {
                from: pair[0],
                to: pair[1],
            })
            .collect()
    }

    /// Disconnects everything.
    pub fn reset(&mut self) {
        self.connected.clear();
    }
}

impl Engine for Constellation {
    fn status(&self) -> Status {
        if !self.stars.is_empty() && self.connected.len() == self.stars.len() {
            Status::Won
        } else {
            Status::InProgress
        }
    }
}
