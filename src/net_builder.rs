pub mod renet_server_builder;
pub mod renet_client_builder;

pub use renet_server_builder::*;
pub use renet_client_builder::*;

use std::time::Duration;
use bevy::{
    app::PluginGroupBuilder,
    prelude::*,
    utils::SystemTime
};
use bevy_replicon::prelude::*;
use bevy_replicon_renet::{
    renet::ConnectionConfig,
    RenetChannelsExt
};
use crate::core::Session;

/// One side of a renet session: its replicon plugins, its transport and its [`Session`].
pub trait SessionBuilder {
    fn session(&self) -> Session;

    fn build_plugins(&self) -> (PluginGroupBuilder, PluginGroupBuilder);

    fn insert_transport(
        &self,
        world: &mut World,
        connection_config: ConnectionConfig,
        current_time: Duration
    ) -> anyhow::Result<()>;

    /// Inserts the transport and, once it is up, the [`Session`] into `world`.
    fn build_transport(&self, world: &mut World) -> anyhow::Result<()> {
        let connection_config = connection_config(world);
        let current_time = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)?;
        self.insert_transport(world, connection_config, current_time)?;

        let session = self.session();
        world.insert_resource(session);
        info!("session started: {session:?}");
        Ok(())
    }
}

/// Renet channel layout matching the replicon channels registered in `world`.
pub fn connection_config(world: &World) -> ConnectionConfig {
    let net_channels = world.resource::<RepliconChannels>();
    ConnectionConfig{
        server_channels_config: net_channels.get_server_configs(),
        client_channels_config: net_channels.get_client_configs(),
        ..default()
    }
}
