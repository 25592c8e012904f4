use std::any::{type_name, TypeId};
use bevy::{
    ecs::entity::{EntityMapper, MapEntities},
    prelude::*
};
use serde::{Serialize, Deserialize};

/// Behaviour of a controllable entity assigned to a [`Client`](super::client::Client).
///
/// Hooks run with exclusive world access:
/// - `on_assign` runs after the client already points at `pawn`.
/// - `on_unassign` runs while the client still points at `pawn`,
///   the default despawns it.
pub trait Pawn: Component {
    fn on_assign(_world: &mut World, _pawn: Entity, _client: Entity) {}

    fn on_unassign(world: &mut World, pawn: Entity) {
        if let Some(entity_mut) = world.get_entity_mut(pawn) {
            entity_mut.despawn_recursive();
        }
    }
}

pub type AssignHook = fn(&mut World, Entity, Entity);
pub type UnassignHook = fn(&mut World, Entity);

/// Type-erased hook table, its presence makes an entity a pawn.
#[derive(Component, Clone, Copy)]
pub struct PawnCapability {
    type_id: TypeId,
    type_name: &'static str,
    on_assign: AssignHook,
    on_unassign: UnassignHook
}

impl PawnCapability {
    #[inline]
    pub fn of<P: Pawn>() -> Self {
        Self{
            type_id: TypeId::of::<P>(),
            type_name: type_name::<P>(),
            on_assign: P::on_assign,
            on_unassign: P::on_unassign
        }
    }

    #[inline]
    pub fn pawn_type_id(&self) -> TypeId {
        self.type_id
    }

    #[inline]
    pub fn pawn_type_name(&self) -> &'static str {
        self.type_name
    }

    #[inline]
    pub fn is<P: Pawn>(&self) -> bool {
        self.type_id == TypeId::of::<P>()
    }

    #[inline]
    pub(crate) fn assign(&self, world: &mut World, pawn: Entity, client: Entity) {
        (self.on_assign)(world, pawn, client)
    }

    #[inline]
    pub(crate) fn unassign(&self, world: &mut World, pawn: Entity) {
        (self.on_unassign)(world, pawn)
    }
}

#[derive(Bundle, Clone)]
pub struct PawnBundle<P: Pawn> {
    pub pawn: P,
    pub capability: PawnCapability
}

impl<P: Pawn> PawnBundle<P> {
    #[inline]
    pub fn new(pawn: P) -> Self {
        Self{
            pawn,
            capability: PawnCapability::of::<P>()
        }
    }
}

/// Client entity a pawn is currently assigned to.
#[derive(Component, Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct AssignedTo(Entity);

impl AssignedTo {
    #[inline]
    pub fn new(client: Entity) -> Self {
        Self(client)
    }

    #[inline]
    pub fn client(&self) -> Entity {
        self.0
    }
}

impl MapEntities for AssignedTo {
    fn map_entities<M: EntityMapper>(&mut self, entity_mapper: &mut M) {
        self.0 = entity_mapper.map_entity(self.0);
    }
}

/// Name the pawn had before it was first labeled for a connection.
#[derive(Component, Clone, Debug)]
pub struct SpawnedName(String);

impl SpawnedName {
    pub const UNNAMED: &'static str = "PAWN";

    #[inline]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[inline]
    pub fn get(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Component)]
    struct Plain;
    impl Pawn for Plain {}

    #[derive(Component)]
    struct Kept;
    impl Pawn for Kept {
        fn on_unassign(world: &mut World, pawn: Entity) {
            world.entity_mut(pawn).remove::<Kept>();
        }
    }

    #[test]
    fn default_unassign_despawns() {
        let mut world = World::new();
        let pawn = world.spawn(PawnBundle::new(Plain)).id();
        let child = world.spawn_empty().set_parent(pawn).id();
        let capability = *world.get::<PawnCapability>(pawn).unwrap();
        capability.unassign(&mut world, pawn);
        assert!(world.get_entity(pawn).is_none());
        assert!(world.get_entity(child).is_none());
        // already gone
        capability.unassign(&mut world, pawn);
    }

    #[test]
    fn overridden_unassign_keeps_entity() {
        let mut world = World::new();
        let pawn = world.spawn(PawnBundle::new(Kept)).id();
        let capability = *world.get::<PawnCapability>(pawn).unwrap();
        assert!(capability.is::<Kept>());
        assert!(!capability.is::<Plain>());
        capability.unassign(&mut world, pawn);
        assert!(world.get_entity(pawn).is_some());
        assert!(world.get::<Kept>(pawn).is_none());
    }
}
