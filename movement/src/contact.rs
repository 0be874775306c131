use crate::types::{SurfaceId, Vec3};

/// A single contact reported by a sweep-move.
///
/// Produced by the physics collaborator and consumed within the same tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ContactEvent {
    /// World-space surface normal, pointing away from the surface (toward the capsule).
    pub normal: Vec3,
    /// World-space contact point.
    pub point: Vec3,
    /// The surface that was hit, if the host can name it.
    pub surface: Option<SurfaceId>,
}

/// Bounded buffer of contacts for one sweep-move.
///
/// The storage is allocated once with the configured capacity and never grows. Contacts
/// past the capacity are counted and dropped; [`ContactBuffer::overflow`] reports how many
/// were reported in total so the caller can raise a single warning per sweep.
#[derive(Clone, Debug)]
pub struct ContactBuffer {
    contacts: Vec<ContactEvent>,
    capacity: usize,
    reported: usize,
}

impl ContactBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            contacts: Vec::with_capacity(capacity),
            capacity,
            reported: 0,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record a contact. Returns `false` when it did not fit.
    pub fn push(&mut self, contact: ContactEvent) -> bool {
        self.reported += 1;
        if self.contacts.len() >= self.capacity {
            return false;
        }
        self.contacts.push(contact);
        true
    }

    pub fn clear(&mut self) {
        self.contacts.clear();
        self.reported = 0;
    }

    /// Contacts kept, in report order.
    #[inline]
    pub fn as_slice(&self) -> &[ContactEvent] {
        &self.contacts
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// Total number of contacts reported since the last clear, if more than fit.
    pub fn overflow(&self) -> Option<usize> {
        (self.reported > self.capacity).then_some(self.reported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(i: usize) -> ContactEvent {
        ContactEvent {
            normal: Vec3::y(),
            point: Vec3::new(i as f32, 0.0, 0.0),
            surface: None,
        }
    }

    #[test]
    fn keeps_first_contacts_and_counts_the_rest() {
        let mut buffer = ContactBuffer::new(8);
        let kept = (0..10).filter(|&i| buffer.push(contact(i))).count();

        assert_eq!(kept, 8);
        assert_eq!(buffer.len(), 8);
        assert_eq!(buffer.as_slice()[7].point.x, 7.0);
        assert_eq!(buffer.overflow(), Some(10));
    }

    #[test]
    fn exactly_full_is_not_an_overflow() {
        let mut buffer = ContactBuffer::new(2);
        buffer.push(contact(0));
        buffer.push(contact(1));
        assert_eq!(buffer.overflow(), None);
    }

    #[test]
    fn clear_resets_the_report_count() {
        let mut buffer = ContactBuffer::new(1);
        buffer.push(contact(0));
        buffer.push(contact(1));
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.overflow(), None);
    }
}
