//! Boundary contacts seen from a seed point

use glam::DVec3;

use crate::grid::VoxelGrid;
use crate::raycast::cast_ray;

/// Where a ray from the seed leaves the foreground
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactPoint {
    /// First background (or out-of-grid) position along the ray
    pub position: DVec3,
    /// Unit vector from the contact back towards the seed
    pub normal: DVec3,
}

impl ContactPoint {
    /// Contact at `position` for rays cast from `seed`
    ///
    /// Returns `None` when the two coincide and the normal is undefined.
    pub fn new(seed: DVec3, position: DVec3) -> Option<Self> {
        let normal = (seed - position).try_normalize()?;
        Some(Self { position, normal })
    }
}

/// Cast one ray per direction from `seed` and collect distinct contacts
///
/// Contacts keep the order of `directions`; a contact position reached by
/// several rays is kept once, at its first occurrence.
pub fn collect_contacts<G>(grid: &G, seed: DVec3, directions: &[DVec3]) -> Vec<ContactPoint>
where
    G: VoxelGrid + ?Sized,
{
    let mut contacts: Vec<ContactPoint> = Vec::with_capacity(directions.len());
    for &direction in directions {
        let position = cast_ray(grid, seed, direction);
        let Some(contact) = ContactPoint::new(seed, position) else {
            continue;
        };
        if !contacts.iter().any(|c| c.position == contact.position) {
            contacts.push(contact);
        }
    }
    contacts
}
