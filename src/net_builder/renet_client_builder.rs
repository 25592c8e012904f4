use std::{
    net::{IpAddr, SocketAddr, UdpSocket},
    time::Duration
};
use bevy::{app::PluginGroupBuilder, prelude::*};
use bevy_replicon::prelude::*;
use bevy_replicon_renet::{
    renet::{
        transport::{ClientAuthentication, ConnectToken, NetcodeClientTransport},
        ConnectionConfig, RenetClient
    },
    server::RepliconRenetServerPlugin,
    RepliconRenetPlugins
};
use crate::core::Session;
use super::SessionBuilder;

/// Observer side: connects to the host with a secure token carrying `user_data`.
pub struct RenetClientBuilder {
    pub client_addr: IpAddr,
    pub server_addr: IpAddr,
    pub server_port: u16,
    pub timeout_seconds: i32,
    pub client_id: u64,
    pub protocol_id: u64,
    pub private_key: [u8; 32],
    pub user_data: [u8; 256],
    pub token_expire_seconds: u64,
}

impl RenetClientBuilder {
    #[inline]
    pub fn server_socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.server_addr, self.server_port)
    }

    pub fn connect_token(&self, current_time: Duration) -> anyhow::Result<ConnectToken> {
        let token = ConnectToken::generate(
            current_time,
            self.protocol_id,
            self.token_expire_seconds,
            self.client_id,
            self.timeout_seconds,
            vec![self.server_socket_addr()],
            Some(&self.user_data),
            &self.private_key
        )?;
        Ok(token)
    }
}

impl SessionBuilder for RenetClientBuilder {
    #[inline]
    fn session(&self) -> Session {
        Session::observer(ClientId::new(self.client_id))
    }

    fn build_plugins(&self) -> (PluginGroupBuilder, PluginGroupBuilder) {
        let replicon = RepliconPlugins.build()
        .disable::<ServerPlugin>();
        let replicon_renet = RepliconRenetPlugins.build()
        .disable::<RepliconRenetServerPlugin>();

        (replicon, replicon_renet)
    }

    fn insert_transport(
        &self,
        world: &mut World,
        connection_config: ConnectionConfig,
        current_time: Duration
    ) -> anyhow::Result<()> {
        let socket = UdpSocket::bind((self.client_addr, 0))?;
        let connect_token = self.connect_token(current_time)?;
        let auth = ClientAuthentication::Secure{ connect_token };
        let netcode_transport = NetcodeClientTransport::new(current_time, auth, socket)?;

        world.insert_resource(RenetClient::new(connection_config));
        world.insert_resource(netcode_transport);
        info!("connecting to: {}", self.server_socket_addr());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;
    use super::*;

    fn builder() -> RenetClientBuilder {
        RenetClientBuilder{
            client_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
            server_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
            server_port: 5000,
            timeout_seconds: 15,
            client_id: 99,
            protocol_id: 7,
            private_key: [3; 32],
            user_data: [0; 256],
            token_expire_seconds: 300
        }
    }

    #[test]
    fn connect_token_targets_the_server() {
        let builder = builder();
        let token = builder.connect_token(Duration::from_secs(10)).unwrap();

        assert_eq!(token.client_id, 99);
        assert_eq!(token.protocol_id, 7);
        assert_eq!(token.timeout_seconds, 15);
        assert_eq!(token.server_addresses[0], Some(builder.server_socket_addr()));
        assert_eq!(token.server_addresses[1], None);
    }

    #[test]
    fn observer_session_is_the_local_connection() {
        let session = builder().session();
        assert!(!session.is_authority());
        assert!(session.is_local(&ClientId::new(99)));
    }
}
