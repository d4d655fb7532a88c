//! Handle placement around a pivot or bounding box
//!
//! Each axis of a placement is Negative, Center or Positive, giving 27
//! combinations. All-Center names the pivot itself and is never used for a
//! handle. Placements are stored in a fixed 27-slot array indexed by
//! `x * 9 + y * 3 + z`.

use glam::Vec3;

/// Number of placement slots (3 directions on 3 axes).
pub const NUM_PLACEMENTS: usize = 27;

/// Direction along one gizmo axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleDirection {
    /// Toward the minimum of the axis
    Negative = 0,
    /// On the pivot
    Center = 1,
    /// Toward the maximum of the axis
    Positive = 2,
}

impl HandleDirection {
    const ALL: [HandleDirection; 3] = [
        HandleDirection::Negative,
        HandleDirection::Center,
        HandleDirection::Positive,
    ];

    /// Signed unit value: -1, 0 or 1.
    pub fn sign(self) -> f32 {
        match self {
            HandleDirection::Negative => -1.0,
            HandleDirection::Center => 0.0,
            HandleDirection::Positive => 1.0,
        }
    }

    /// Negative becomes Positive and vice versa; Center stays put.
    pub fn flipped(self) -> Self {
        match self {
            HandleDirection::Negative => HandleDirection::Positive,
            HandleDirection::Center => HandleDirection::Center,
            HandleDirection::Positive => HandleDirection::Negative,
        }
    }

    fn from_digit(digit: usize) -> Self {
        Self::ALL[digit % 3]
    }
}

/// Result of scanning a placement's axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CenterAxisInfo {
    /// How many axes are Center
    pub center_count: usize,
    /// The non-Center axis, defined only when exactly two axes are Center
    pub facing_axis: Option<usize>,
    /// The Center axis, defined only when exactly one axis is Center
    pub center_axis: Option<usize>,
}

/// One of the 27 canonical positions around a pivot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlePlacement {
    /// Direction per axis (X, Y, Z)
    pub axes: [HandleDirection; 3],
}

impl HandlePlacement {
    /// Creates a placement from its three axis directions.
    pub const fn new(x: HandleDirection, y: HandleDirection, z: HandleDirection) -> Self {
        Self { axes: [x, y, z] }
    }

    /// Placement with one non-Center axis.
    pub fn on_axis(axis: usize, direction: HandleDirection) -> Self {
        let mut axes = [HandleDirection::Center; 3];
        axes[axis % 3] = direction;
        Self { axes }
    }

    /// Slot index of this placement.
    pub fn index(&self) -> usize {
        self.axes[0] as usize * 9 + self.axes[1] as usize * 3 + self.axes[2] as usize
    }

    /// Placement stored at `index`, or `None` past the last slot.
    pub fn from_index(index: usize) -> Option<Self> {
        (index < NUM_PLACEMENTS).then(|| {
            Self::new(
                HandleDirection::from_digit(index / 9),
                HandleDirection::from_digit(index / 3),
                HandleDirection::from_digit(index),
            )
        })
    }

    /// Every placement in slot order, the all-Center one included.
    pub fn all() -> impl Iterator<Item = HandlePlacement> {
        (0..NUM_PLACEMENTS).filter_map(Self::from_index)
    }

    /// Returns false for the all-Center placement.
    pub fn is_valid(&self) -> bool {
        self.center_handle_count() < 3
    }

    /// Counts Center axes and derives the facing and center axes.
    pub fn center_handle_count_and_facing_axis(&self) -> CenterAxisInfo {
        let mut center_count = 0;
        let mut facing = None;
        let mut center = None;
        for (axis, direction) in self.axes.iter().enumerate() {
            if *direction == HandleDirection::Center {
                center_count += 1;
                center = Some(axis);
            } else {
                facing = Some(axis);
            }
        }

        CenterAxisInfo {
            center_count,
            facing_axis: if center_count == 2 { facing } else { None },
            center_axis: if center_count == 1 { center } else { None },
        }
    }

    /// Number of Center axes.
    pub fn center_handle_count(&self) -> usize {
        self.axes
            .iter()
            .filter(|direction| **direction == HandleDirection::Center)
            .count()
    }

    /// The single non-Center axis of an arrow or plane placement.
    pub fn facing_axis_index(&self) -> Option<usize> {
        self.center_handle_count_and_facing_axis().facing_axis
    }

    /// The single Center axis of an edge placement.
    pub fn center_axis_index(&self) -> Option<usize> {
        self.center_handle_count_and_facing_axis().center_axis
    }

    /// Signed unit basis vector for one axis of this placement (zero on
    /// Center axes).
    pub fn axis_vector(&self, axis: usize) -> Vec3 {
        axis_vector(axis, self.axes[axis % 3])
    }

    /// Sum of the signed basis vectors of every axis.
    pub fn direction_vector(&self) -> Vec3 {
        Vec3::new(
            self.axes[0].sign(),
            self.axes[1].sign(),
            self.axes[2].sign(),
        )
    }

    /// Copy with the facing axis pointing the other way. Placements without
    /// a facing axis are returned unchanged.
    pub fn with_flipped_facing(&self) -> Self {
        let mut flipped = *self;
        if let Some(axis) = self.facing_axis_index() {
            flipped.axes[axis] = flipped.axes[axis].flipped();
        }
        flipped
    }

    /// Human-readable label such as `"FrontTop"`.
    pub fn name(&self) -> String {
        const TOKENS: [[&str; 2]; 3] = [["Back", "Front"], ["Left", "Right"], ["Bottom", "Top"]];
        let mut name = String::new();
        for (axis, direction) in self.axes.iter().enumerate() {
            match direction {
                HandleDirection::Negative => name.push_str(TOKENS[axis][0]),
                HandleDirection::Positive => name.push_str(TOKENS[axis][1]),
                HandleDirection::Center => {}
            }
        }
        if name.is_empty() {
            name.push_str("Center");
        }
        name
    }
}

/// Signed unit vector along `axis` for `direction`.
pub fn axis_vector(axis: usize, direction: HandleDirection) -> Vec3 {
    let mut vector = Vec3::ZERO;
    vector[axis % 3] = direction.sign();
    vector
}
