use std::{
    net::{IpAddr, SocketAddr, UdpSocket},
    time::Duration
};
use bevy::{app::PluginGroupBuilder, prelude::*};
use bevy_replicon::prelude::*;
use bevy_replicon_renet::{
    client::RepliconRenetClientPlugin,
    renet::{
        transport::{NetcodeServerTransport, ServerAuthentication},
        ConnectionConfig, RenetServer
    },
    RepliconRenetPlugins
};
use bevy_replicon_renet::renet::transport::ServerConfig as RenetServerConfig;
use crate::core::Session;
use super::SessionBuilder;

/// Host side: listens for observers and owns every client and pawn.
pub struct RenetServerBuilder {
    pub network_tick_rate: u16,
    pub listen_addr: IpAddr,
    pub listen_port: u16,
    pub protocol_id: u64,
    pub private_key: [u8; 32],
    pub max_clients: usize
}

impl RenetServerBuilder {
    #[inline]
    pub fn listen_socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.listen_addr, self.listen_port)
    }

    pub fn server_config(&self, current_time: Duration) -> RenetServerConfig {
        RenetServerConfig{
            current_time,
            max_clients: self.max_clients,
            protocol_id: self.protocol_id,
            authentication: ServerAuthentication::Secure{
                private_key: self.private_key
            },
            public_addresses: vec![self.listen_socket_addr()]
        }
    }
}

impl SessionBuilder for RenetServerBuilder {
    #[inline]
    fn session(&self) -> Session {
        Session::host()
    }

    fn build_plugins(&self) -> (PluginGroupBuilder, PluginGroupBuilder) {
        let replicon = RepliconPlugins.build()
        .disable::<ClientPlugin>()
        .set(ServerPlugin{
            tick_policy: TickPolicy::MaxTickRate(self.network_tick_rate),
            visibility_policy: VisibilityPolicy::All,
            ..default()
        });
        let replicon_renet = RepliconRenetPlugins.build()
        .disable::<RepliconRenetClientPlugin>();

        (replicon, replicon_renet)
    }

    fn insert_transport(
        &self,
        world: &mut World,
        connection_config: ConnectionConfig,
        current_time: Duration
    ) -> anyhow::Result<()> {
        let listen_addr = self.listen_socket_addr();
        let socket = UdpSocket::bind(listen_addr)?;
        let netcode_transport = NetcodeServerTransport::new(
            self.server_config(current_time),
            socket
        )?;

        world.insert_resource(RenetServer::new(connection_config));
        world.insert_resource(netcode_transport);
        info!("listening at: {listen_addr}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;
    use super::*;

    fn builder() -> RenetServerBuilder {
        RenetServerBuilder{
            network_tick_rate: 30,
            listen_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
            listen_port: 5000,
            protocol_id: 7,
            private_key: [3; 32],
            max_clients: 4
        }
    }

    #[test]
    fn server_config_advertises_listen_address() {
        let builder = builder();
        let config = builder.server_config(Duration::from_secs(10));

        assert_eq!(config.public_addresses, vec![builder.listen_socket_addr()]);
        assert_eq!(config.max_clients, 4);
        assert_eq!(config.protocol_id, 7);
        assert_eq!(config.current_time, Duration::from_secs(10));
        assert!(matches!(
            config.authentication,
            ServerAuthentication::Secure { private_key } if private_key == [3; 32]
        ));
    }

    #[test]
    fn server_is_the_authority() {
        assert!(builder().session().is_authority());
    }
}
