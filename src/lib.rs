pub mod core;
pub mod error;
pub mod net_builder;
pub mod dev;

pub mod prelude {
    pub use crate::{
        core::*,
        error::*,
        net_builder::*,
        PawnsPlugin
    };
}

use bevy::prelude::*;
use bevy_replicon::prelude::*;
use prelude::*;
use crate::core::{
    connection::track_connections_system,
    network_owner::mark_owning_system,
    assignment::manage_clients_system
};

/// Replicates client and pawn ownership and keeps it in sync with the session.
pub struct PawnsPlugin {
    /// Display name of the authority's own connection.
    pub host_display_name: String,
    /// Spawn and bind a client entity for each new connection.
    pub auto_spawn_clients: bool
}

impl Default for PawnsPlugin {
    fn default() -> Self {
        Self{
            host_display_name: "host".to_string(),
            auto_spawn_clients: true
        }
    }
}

impl Plugin for PawnsPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Connections::new(self.host_display_name.clone()))
        .insert_resource(PawnSettings{
            auto_spawn_clients: self.auto_spawn_clients
        })
        .init_resource::<ConnectionClientMap>()
        .init_resource::<PawnTemplates>()
        .add_event::<PawnEvent>()
        .add_event::<ClientEvent>()
        .replicate_mapped::<Client>()
        .replicate_mapped::<AssignedTo>()
        .replicate::<NetworkOwner>()
        .configure_sets(PreUpdate, (
            PawnServerSet::TrackConnections,
            PawnServerSet::ManageClients
        ).chain().after(ServerSet::Receive))
        .configure_sets(PreUpdate,
            PawnClientSet::MarkOwning
            .after(ClientSet::Receive)
        )
        .add_systems(PreUpdate, (
            track_connections_system
            .in_set(PawnServerSet::TrackConnections),
            manage_clients_system
            .in_set(PawnServerSet::ManageClients)
        ).run_if(is_host))
        .add_systems(PreUpdate,
            mark_owning_system
            .in_set(PawnClientSet::MarkOwning)
            .run_if(has_session)
        );
    }
}
