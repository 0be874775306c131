//! Collision layers and layer masks.
//!
//! The host physics engine assigns every collider one of 32 layers and keeps a symmetric
//! "layer A ignores layer B" matrix. Queries issued by the controller (ground snap, menu
//! probe) are filtered by a [`LayerMask`] derived from that matrix.

use num_traits::{One, PrimInt};

/// Trait implemented by types that name a single bit of a mask.
///
/// You choose the backing integer type via the associated `Storage`.
pub trait FlagBitmask {
    type Storage: PrimInt;

    fn bit_index(&self) -> u8;

    fn mask(&self) -> Self::Storage {
        // NOTE: `bit_index()` must be < number of bits in `Storage`.
        Self::Storage::one() << (self.bit_index() as usize)
    }
}

/// A plain bitmask container over any primitive integer.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq)]
pub struct BitmaskFlags<T: PrimInt> {
    pub bits: T,
}

impl<T: PrimInt> BitmaskFlags<T> {
    pub fn new(bits: T) -> Self {
        Self { bits }
    }

    pub fn empty() -> Self {
        Self::new(T::zero())
    }

    pub fn all() -> Self {
        Self::new(!T::zero())
    }

    pub fn add<U: FlagBitmask<Storage = T>>(&mut self, flag: U) {
        self.bits = self.bits | flag.mask();
    }

    pub fn remove<U: FlagBitmask<Storage = T>>(&mut self, flag: U) {
        self.bits = self.bits & !flag.mask();
    }

    pub fn has<U: FlagBitmask<Storage = T>>(&self, flag: U) -> bool {
        (self.bits & flag.mask()) != T::zero()
    }

    pub fn with<U: FlagBitmask<Storage = T>>(mut self, flag: U) -> Self {
        self.add(flag);
        self
    }

    pub fn without<U: FlagBitmask<Storage = T>>(mut self, flag: U) -> Self {
        self.remove(flag);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.bits == T::zero()
    }
}

/// Number of layers supported by a [`LayerMask`].
pub const LAYER_COUNT: u8 = 32;

/// One collision layer (0..32).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Layer(pub u8);

impl Layer {
    /// Layer used by colliders that don't ask for anything else.
    pub const DEFAULT: Layer = Layer(0);
}

impl FlagBitmask for Layer {
    type Storage = u32;

    fn bit_index(&self) -> u8 {
        self.0 % LAYER_COUNT
    }
}

/// Set of layers a query or collider interacts with.
pub type LayerMask = BitmaskFlags<u32>;

/// Symmetric table of layer pairs that never collide.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LayerCollisionMatrix {
    ignored: [u32; LAYER_COUNT as usize],
}

impl LayerCollisionMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `a` and `b` ignore (or stop ignoring) each other.
    pub fn set_ignore(&mut self, a: Layer, b: Layer, ignore: bool) {
        let (ia, ib) = (a.bit_index() as usize, b.bit_index() as usize);
        if ignore {
            self.ignored[ia] |= b.mask();
            self.ignored[ib] |= a.mask();
        } else {
            self.ignored[ia] &= !b.mask();
            self.ignored[ib] &= !a.mask();
        }
    }

    /// Every layer that `layer` collides with.
    pub fn collision_mask(&self, layer: Layer) -> LayerMask {
        LayerMask::new(!self.ignored[layer.bit_index() as usize])
    }
}
