//! Built-in terrain layouts

use miasma_logic::{TerrainBuilder, TerrainClass, TerrainError, TerrainMap};

pub const WARD_SIZE: usize = 50;

/// The 50x50 two-room ward.
///
/// Agents start in the north-west room (door on its south wall at
/// `x = 10..15`) and head for the south-east room (door on its north wall
/// at `x = 35..40`). With `quarantine` set, a 6x6 isolation ward sits in the
/// open north-east corner.
pub fn standard_ward(quarantine: bool) -> Result<TerrainMap, TerrainError> {
    let size = WARD_SIZE as i32;
    let mut builder = TerrainBuilder::new(WARD_SIZE, WARD_SIZE)?
        .zone(TerrainClass::Start, 0, 0, 10, 10)?
        .zone(TerrainClass::Target, 40, 40, size, size)?
        .h_wall(0, 20, 10)?
        .h_wall(15, 20, 20)?
        .v_wall(20, 0, 20)?
        .h_wall(30, 30, 35)?
        .h_wall(40, 30, size)?
        .v_wall(30, 30, size)?;
    if quarantine {
        builder = builder.zone(TerrainClass::Quarantine, size - 6, 0, size, 6)?;
    }
    TerrainMap::from_parts(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use miasma_logic::{Cell, HeuristicKind, PathPlanner, Zone};

    #[test]
    fn test_ward_geometry() {
        let map = standard_ward(true).unwrap();
        assert_eq!(map.shape(), (WARD_SIZE, WARD_SIZE));
        assert_eq!(map.wall_segments().len(), 6);
        assert_eq!(map.zone(Zone::Start).len(), 100);
        assert_eq!(map.zone(Zone::Target).len(), 100);
        assert_eq!(map.zone(Zone::Quarantine).len(), 36);
        assert!(map.is_wall(Cell::new(20, 5)));
        assert!(!map.is_wall(Cell::new(12, 20)), "door");
    }

    #[test]
    fn test_rooms_connect_through_doors() {
        let map = standard_ward(false).unwrap();
        let route = PathPlanner::new(HeuristicKind::Euclidean)
            .find_path(map.graph(), Cell::new(0, 0), Cell::new(49, 49))
            .unwrap();
        assert!(route.iter().all(|c| !map.is_wall(*c)));
        assert!(map.zone(Zone::Quarantine).is_empty());
    }
}
