pub mod config;
pub mod game_server;
pub mod game_client;

use anyhow::bail;
use bevy::{
    ecs::entity::{EntityMapper, MapEntities},
    prelude::*
};
use bevy_replicon::prelude::*;
use bevy_replicon_renet::renet::transport::NetcodeTransportError;
use serde::{Serialize, Deserialize};
use rand::prelude::*;
use uuid::Uuid;
use crate::prelude::*;
use config::*;

pub struct GameCommonPlugin;

impl Plugin for GameCommonPlugin {
    fn build(&self, app: &mut App) {
        app.replicate_mapped::<ExamplePawn>()
        .replicate::<PawnPresentation>();
    }
}

/// Pawn that remembers the client it was assigned to.
#[derive(Component, Serialize, Deserialize, Default, Clone, Copy, Debug)]
pub struct ExamplePawn {
    owner: Option<Entity>
}

impl ExamplePawn {
    #[inline]
    pub fn owner(&self) -> Option<Entity> {
        self.owner
    }
}

impl Pawn for ExamplePawn {
    fn on_assign(world: &mut World, pawn: Entity, client: Entity) {
        if let Some(mut p) = world.get_mut::<ExamplePawn>(pawn) {
            p.owner = Some(client);
        }
    }
}

impl MapEntities for ExamplePawn {
    fn map_entities<M: EntityMapper>(&mut self, entity_mapper: &mut M) {
        if let Some(owner) = self.owner.as_mut() {
            *owner = entity_mapper.map_entity(*owner);
        }
    }
}

#[derive(Component, Serialize, Deserialize, Clone, Copy)]
pub struct PawnPresentation {
    pub color: Color
}

impl PawnPresentation {
    #[inline]
    pub fn random() -> Self {
        Self{
            color: Color::srgb(
                random(), 
                random(), 
                random()
            )
        }
    }
}

pub fn example_pawn_template() -> PawnTemplate {
    PawnTemplate::new(|world| {
        world.spawn((
            PawnBundle::new(ExamplePawn::default()),
            PawnPresentation::random(),
            Name::new(EXAMPLE_PAWN_NAME)
        ))
        .id()
    })
}

const USER_DATA_UUID_LEN: usize = 16;

/// Netcode user data: uuid, name length, utf-8 name.
pub fn encode_user_data(uuid: &Uuid, display_name: &str) -> anyhow::Result<[u8; 256]> {
    let name = display_name.as_bytes();
    let max = 256 - USER_DATA_UUID_LEN - 1;
    if name.len() > max {
        bail!("display name is longer than {max} bytes");
    }

    let mut user_data = [0u8; 256];
    user_data[..USER_DATA_UUID_LEN].copy_from_slice(uuid.as_bytes());
    user_data[USER_DATA_UUID_LEN] = name.len() as u8;
    let begin = USER_DATA_UUID_LEN + 1;
    user_data[begin..begin + name.len()].copy_from_slice(name);
    Ok(user_data)
}

pub fn decode_user_data(user_data: &[u8; 256]) -> anyhow::Result<(Uuid, String)> {
    let uuid = Uuid::from_slice(&user_data[..USER_DATA_UUID_LEN])?;
    let len = user_data[USER_DATA_UUID_LEN] as usize;
    let begin = USER_DATA_UUID_LEN + 1;
    if begin + len > user_data.len() {
        bail!("display name length {len} is out of range");
    }
    let name = std::str::from_utf8(&user_data[begin..begin + len])?;
    Ok((uuid, name.to_string()))
}

pub fn handle_transport_error(mut errors: EventReader<NetcodeTransportError>) {
    for e in errors.read() {
        panic!("{e}")
    }
}

pub fn error(error: anyhow::Error) {
    panic!("{error}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_data_carries_uuid_and_name() {
        let uuid = Uuid::new_v4();
        let user_data = encode_user_data(&uuid, "alice").unwrap();
        let (decoded_uuid, name) = decode_user_data(&user_data).unwrap();
        assert_eq!(decoded_uuid, uuid);
        assert_eq!(name, "alice");
    }

    #[test]
    fn long_display_name_is_rejected() {
        let name = "x".repeat(300);
        assert!(encode_user_data(&Uuid::new_v4(), &name).is_err());
    }

    #[test]
    fn invalid_utf8_name_is_rejected() {
        let mut user_data = encode_user_data(&Uuid::new_v4(), "ab").unwrap();
        user_data[17] = 0xff;
        assert!(decode_user_data(&user_data).is_err());
    }

    #[test]
    fn example_pawn_records_owner() {
        let mut world = World::new();
        world.init_resource::<Connections>();
        let session = Session::host();
        let client = world.spawn_client(&session, None).unwrap();
        let pawn = world.assign_pawn_from_template(
            &session, 
            client, 
            &example_pawn_template()
        )
        .unwrap();

        let example = world.get::<ExamplePawn>(pawn).unwrap();
        assert_eq!(example.owner(), Some(client));
        assert_eq!(world.get::<Name>(pawn).unwrap().as_str(), "host - ExamplePawn");
    }
}
