use bevy::prelude::*;
use crate::{
    dev::*,
    prelude::*
};

pub struct GameClientPlugin;

impl Plugin for GameClientPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(GameCommonPlugin)
        .add_systems(Update, (
            handle_transport_error,
            handle_client_replicated,
            handle_pawn_possessed
        ).chain());
    }
}

fn handle_client_replicated(
    query: Query<(Entity, &Client), Changed<Client>>,
    session: Res<Session>
) {
    for (e, client) in query.iter() {
        let is_local = client.connection_id()
        .is_some_and(|c| session.is_local(&c));
        if is_local {
            info!("local client: {e:?} now controls pawn: {:?}", client.pawn());
        } else {
            debug!("remote client: {e:?} now controls pawn: {:?}", client.pawn());
        }
    }
}

fn handle_pawn_possessed(
    query: Query<(Entity, &ExamplePawn, &PawnPresentation), Added<Owning>>
) {
    for (e, pawn, presentation) in query.iter() {
        info!(
            "possessing pawn: {e:?} owner: {:?} color: {:?}", 
            pawn.owner(), presentation.color
        );
    }
}
