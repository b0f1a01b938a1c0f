#![allow(dead_code)]

use archway::{EcsResult, World};

pub const AGENTS_SMALL: usize = 100_000;
pub const AGENTS_MED: usize = 1_000_000;

#[derive(Clone, Copy)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Copy)]
pub struct Velocity {
    pub dx: f32,
    pub dy: f32,
}

#[derive(Clone, Copy)]
pub struct Wealth {
    pub value: f32,
}

pub fn make_world() -> World {
    let mut world = World::new();
    world.register_component::<Position>();
    world.register_component::<Velocity>();
    world.register_component::<Wealth>();
    world
}

pub fn populate(world: &mut World, n: usize) -> EcsResult<()> {
    for i in 0..n {
        let x = (i % 1000) as f32;
        world.spawn_with((
            Position { x, y: -x },
            Velocity { dx: 1.0, dy: 0.5 },
        ))?;
    }
    Ok(())
}

pub fn populate_mixed(world: &mut World, n: usize) -> EcsResult<()> {
    for i in 0..n {
        let x = (i % 1000) as f32;
        if i % 2 == 0 {
            world.spawn_with((
                Position { x, y: -x },
                Velocity { dx: 1.0, dy: 0.5 },
                Wealth { value: x },
            ))?;
        } else {
            world.spawn_with((Position { x, y: -x }, Velocity { dx: 1.0, dy: 0.5 }))?;
        }
    }
    Ok(())
}
