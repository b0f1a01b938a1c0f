use archway::{Entity, World};

#[derive(Clone, Copy, Debug, PartialEq)]
struct Position {
    x: f32,
    y: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Velocity {
    dx: f32,
    dy: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Health(u32);

#[derive(Clone, Copy, Debug, PartialEq)]
struct Tag;

fn world_with_movement_types() -> World {
    let mut world = World::new();
    world.register_component::<Position>();
    world.register_component::<Velocity>();
    world
}

#[test]
fn registration_is_idempotent() {
    let mut world = World::new();
    let first = world.register_component::<Position>();
    let second = world.register_component::<Position>();
    assert_eq!(first, second);

    let velocity = world.register_component::<Velocity>();
    assert_ne!(first, velocity);

    let desc = world.registry().desc(first);
    assert_eq!(desc.size, std::mem::size_of::<Position>());
    assert_eq!(desc.align, std::mem::align_of::<Position>());
    assert_eq!(world.registry().len(), 2);
}

#[test]
fn component_id_never_registers() {
    let world = World::new();
    assert!(world.component_id::<Position>().is_none());
    assert_eq!(world.registry().len(), 0);
}

#[test]
fn integrate_position_by_velocity_100_steps() {
    let mut world = world_with_movement_types();
    let entity = world
        .spawn_with((Position { x: 0.0, y: 0.0 }, Velocity { dx: 1.0, dy: 1.0 }))
        .unwrap();

    for _ in 0..100 {
        for (positions, velocities) in world.iter::<(&mut Position, &Velocity)>() {
            for (position, velocity) in positions.iter_mut().zip(velocities) {
                position.x += velocity.dx;
                position.y += velocity.dy;
            }
        }
    }

    assert_eq!(world.get::<Position>(entity), Some(&Position { x: 100.0, y: 100.0 }));
    assert_eq!(world.get::<Velocity>(entity), Some(&Velocity { dx: 1.0, dy: 1.0 }));
}

#[test]
fn iteration_matches_archetype_supersets() {
    let mut world = world_with_movement_types();

    for i in 0..3 {
        world.spawn_with((Position { x: i as f32, y: 0.0 },)).unwrap();
    }
    for i in 0..2 {
        world
            .spawn_with((Position { x: i as f32, y: 1.0 }, Velocity { dx: 0.0, dy: 0.0 }))
            .unwrap();
    }

    let both: usize = world
        .iter::<(&Position, &Velocity)>()
        .map(|(positions, _)| positions.len())
        .sum();
    assert_eq!(both, 2);

    let positions_only: usize = world
        .iter::<(&Position,)>()
        .map(|(positions,)| positions.len())
        .sum();
    assert_eq!(positions_only, 5);
}

#[test]
fn iteration_skips_tables_missing_a_column() {
    let mut world = world_with_movement_types();
    world.spawn_with((Velocity { dx: 1.0, dy: 0.0 },)).unwrap();

    assert_eq!(world.iter::<(&Position, &Velocity)>().count(), 0);
}

#[test]
fn add_moves_entity_and_fixes_swapped_row() {
    let mut world = world_with_movement_types();

    let first = world.spawn_with((Position { x: 1.0, y: 0.0 },)).unwrap();
    let second = world.spawn_with((Position { x: 2.0, y: 0.0 },)).unwrap();
    let third = world.spawn_with((Position { x: 3.0, y: 0.0 },)).unwrap();

    // Moving the first row out of a three-row table swaps the last row in.
    world.add(first, Velocity { dx: 9.0, dy: 9.0 }).unwrap();

    assert_eq!(world.get::<Position>(first), Some(&Position { x: 1.0, y: 0.0 }));
    assert_eq!(world.get::<Velocity>(first), Some(&Velocity { dx: 9.0, dy: 9.0 }));

    assert_eq!(world.get::<Position>(second), Some(&Position { x: 2.0, y: 0.0 }));
    assert_eq!(world.get::<Position>(third), Some(&Position { x: 3.0, y: 0.0 }));
    assert!(world.get::<Velocity>(second).is_none());
    assert!(world.get::<Velocity>(third).is_none());
}

#[test]
fn add_then_del_returns_to_prior_archetype() {
    let mut world = world_with_movement_types();

    let entity = world.spawn_with((Position { x: 1.0, y: 2.0 },)).unwrap();
    world.add(entity, Velocity { dx: 0.5, dy: 0.5 }).unwrap();
    world.del::<Velocity>(entity).unwrap();

    assert_eq!(world.get::<Position>(entity), Some(&Position { x: 1.0, y: 2.0 }));
    assert!(world.get::<Velocity>(entity).is_none());

    // A fresh position-only entity lands in the same table: one matching
    // table holding both rows, not two.
    world.spawn_with((Position { x: 7.0, y: 7.0 },)).unwrap();
    let tables: Vec<usize> = world
        .iter::<(&Position,)>()
        .map(|(positions,)| positions.len())
        .filter(|len| *len > 0)
        .collect();
    assert_eq!(tables, vec![2]);
}

#[test]
fn del_of_absent_component_is_a_no_op() {
    let mut world = world_with_movement_types();
    let entity = world.spawn_with((Position { x: 0.0, y: 0.0 },)).unwrap();

    world.del::<Velocity>(entity).unwrap();
    assert_eq!(world.get::<Position>(entity), Some(&Position { x: 0.0, y: 0.0 }));
}

#[test]
fn del_of_last_component_moves_to_empty_archetype() {
    let mut world = world_with_movement_types();
    let entity = world.spawn_with((Position { x: 0.0, y: 0.0 },)).unwrap();

    world.del::<Position>(entity).unwrap();
    assert!(world.is_alive(entity));
    assert!(world.get::<Position>(entity).is_none());
}

#[test]
fn put_adds_then_overwrites() {
    let mut world = world_with_movement_types();
    let entity = world.spawn_with((Position { x: 0.0, y: 0.0 },)).unwrap();

    world.put(entity, Velocity { dx: 1.0, dy: 2.0 }).unwrap();
    assert_eq!(world.get::<Velocity>(entity), Some(&Velocity { dx: 1.0, dy: 2.0 }));

    world.put(entity, Velocity { dx: 3.0, dy: 4.0 }).unwrap();
    assert_eq!(world.get::<Velocity>(entity), Some(&Velocity { dx: 3.0, dy: 4.0 }));
}

#[test]
fn set_overwrites_in_place() {
    let mut world = world_with_movement_types();
    let entity = world.spawn_with((Position { x: 0.0, y: 0.0 },)).unwrap();

    world.set(entity, Position { x: 5.0, y: 6.0 });
    assert_eq!(world.get::<Position>(entity), Some(&Position { x: 5.0, y: 6.0 }));
}

#[test]
#[should_panic]
fn set_of_absent_component_panics() {
    let mut world = world_with_movement_types();
    let entity = world.spawn_with((Position { x: 0.0, y: 0.0 },)).unwrap();
    world.set(entity, Velocity { dx: 0.0, dy: 0.0 });
}

#[test]
#[should_panic]
fn add_of_present_component_panics() {
    let mut world = world_with_movement_types();
    let entity = world.spawn_with((Position { x: 0.0, y: 0.0 },)).unwrap();
    world.add(entity, Position { x: 1.0, y: 1.0 }).unwrap();
}

#[test]
#[should_panic]
fn unregistered_component_type_panics() {
    let mut world = World::new();
    let entity = world.spawn().unwrap();
    world.add(entity, Health(10)).unwrap();
}

#[test]
fn despawn_invalidates_handle_and_recycles_slot() {
    let mut world = world_with_movement_types();

    let stale = world.spawn_with((Position { x: 0.0, y: 0.0 },)).unwrap();
    assert!(world.is_alive(stale));

    world.despawn(stale);
    assert!(!world.is_alive(stale));

    // The slot is reused LIFO with a bumped generation, so the old handle
    // stays dead.
    let fresh = world.spawn().unwrap();
    assert!(world.is_alive(fresh));
    assert_ne!(fresh, stale);
    assert_eq!(fresh.index(), stale.index());
    assert_ne!(fresh.generation(), stale.generation());
    assert!(!world.is_alive(stale));
}

#[test]
fn despawn_of_stale_handle_is_a_no_op() {
    let mut world = world_with_movement_types();
    let entity = world.spawn_with((Position { x: 0.0, y: 0.0 },)).unwrap();

    world.despawn(entity);
    world.despawn(entity);
    assert!(!world.is_alive(entity));
}

#[test]
fn despawn_fixes_swapped_row() {
    let mut world = world_with_movement_types();

    let first = world.spawn_with((Position { x: 1.0, y: 0.0 },)).unwrap();
    let second = world.spawn_with((Position { x: 2.0, y: 0.0 },)).unwrap();
    let third = world.spawn_with((Position { x: 3.0, y: 0.0 },)).unwrap();

    world.despawn(first);

    assert!(!world.is_alive(first));
    assert_eq!(world.get::<Position>(second), Some(&Position { x: 2.0, y: 0.0 }));
    assert_eq!(world.get::<Position>(third), Some(&Position { x: 3.0, y: 0.0 }));
}

#[test]
fn is_alive_rejects_out_of_range_and_mismatched_handles() {
    let mut world = world_with_movement_types();
    let entity = world.spawn().unwrap();

    assert!(world.is_alive(entity));
    // A handle whose index was never allocated.
    assert!(!world.is_alive(Entity(0x00FF_FFFF)));
    // Same index, wrong generation.
    let forged = Entity(entity.0 | 1 << 27);
    assert_ne!(forged.generation(), entity.generation());
    assert!(!world.is_alive(forged));
}

#[test]
fn spawn_without_components_then_build_up() {
    let mut world = world_with_movement_types();

    let entity = world.spawn().unwrap();
    assert!(world.is_alive(entity));
    assert!(world.get::<Position>(entity).is_none());

    world.add(entity, Position { x: 4.0, y: 4.0 }).unwrap();
    world.add(entity, Velocity { dx: 1.0, dy: 0.0 }).unwrap();

    assert_eq!(world.get::<Position>(entity), Some(&Position { x: 4.0, y: 4.0 }));
    assert_eq!(world.get::<Velocity>(entity), Some(&Velocity { dx: 1.0, dy: 0.0 }));
}

#[test]
fn zero_size_markers_round_trip_and_iterate() {
    let mut world = world_with_movement_types();
    world.register_component::<Tag>();

    let tagged = world.spawn_with((Position { x: 0.0, y: 0.0 },)).unwrap();
    world.spawn_with((Position { x: 1.0, y: 1.0 },)).unwrap();
    world.add(tagged, Tag).unwrap();

    assert_eq!(world.get::<Tag>(tagged), Some(&Tag));

    let tag_id = world.component_id::<Tag>().unwrap();
    assert!(world.get_raw(tagged, tag_id).is_some());

    let tagged_rows: usize = world.iter::<(&Tag,)>().map(|(tags,)| tags.len()).sum();
    assert_eq!(tagged_rows, 1);

    let tagged_positions: usize = world
        .iter::<(&Position, &Tag)>()
        .map(|(positions, _)| positions.len())
        .sum();
    assert_eq!(tagged_positions, 1);
}

#[test]
fn raw_byte_round_trip() {
    let mut world = world_with_movement_types();
    let entity = world.spawn().unwrap();
    let position_id = world.component_id::<Position>().unwrap();

    let written = Position { x: 1.5, y: -2.5 };
    let bytes = unsafe {
        std::slice::from_raw_parts(
            &written as *const Position as *const u8,
            std::mem::size_of::<Position>(),
        )
    };
    world.add_raw(entity, position_id, bytes).unwrap();

    let ptr = world.get_raw(entity, position_id).unwrap();
    let read = unsafe { *(ptr.as_ptr() as *const Position) };
    assert_eq!(read, written);
    assert_eq!(world.get::<Position>(entity), Some(&written));
}

#[test]
fn get_mut_writes_through() {
    let mut world = world_with_movement_types();
    let entity = world.spawn_with((Position { x: 0.0, y: 0.0 },)).unwrap();

    world.get_mut::<Position>(entity).unwrap().x = 42.0;
    assert_eq!(world.get::<Position>(entity), Some(&Position { x: 42.0, y: 0.0 }));
}

#[test]
fn many_entities_across_many_archetypes_stay_consistent() {
    let mut world = world_with_movement_types();
    world.register_component::<Health>();

    let mut spawned: Vec<(Entity, f32)> = Vec::new();
    for i in 0..64 {
        let x = i as f32;
        let entity = world.spawn_with((Position { x, y: 0.0 },)).unwrap();
        if i % 2 == 0 {
            world.add(entity, Velocity { dx: 1.0, dy: 0.0 }).unwrap();
        }
        if i % 3 == 0 {
            world.add(entity, Health(i)).unwrap();
        }
        spawned.push((entity, x));
    }

    for i in (0..64).step_by(4) {
        world.despawn(spawned[i].0);
    }

    for (i, (entity, x)) in spawned.iter().enumerate() {
        if i % 4 == 0 {
            assert!(!world.is_alive(*entity));
        } else {
            assert_eq!(world.get::<Position>(*entity), Some(&Position { x: *x, y: 0.0 }));
            assert_eq!(world.get::<Velocity>(*entity).is_some(), i % 2 == 0);
            assert_eq!(world.get::<Health>(*entity).is_some(), i % 3 == 0);
        }
    }
}
