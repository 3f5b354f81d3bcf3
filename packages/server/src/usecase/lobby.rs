//! UseCase: 接続・参加・切断
//!
//! 参加時の役割はその時点のフェーズで決まります（進行中なら観戦者）。
//! 同じユーザー名で別の接続から参加した場合、古い接続へ `duplicateIdentity`
//! を送ってから切断します。

use super::coordinator::RaceCoordinator;
use crate::{
    domain::{ConnectionId, Phase, RaceError, Role, Username},
    infrastructure::{
        broadcast::OutboundSender, dto::websocket::ServerEvent, repository::JoinOutcome,
    },
};

const SPECTATOR_MESSAGE: &str = "Game in progress. You'll be able to play next round.";
const DUPLICATE_MESSAGE: &str = "You have been disconnected because you joined from another window.";

impl RaceCoordinator {
    pub(super) fn connect(&mut self, connection_id: ConnectionId, sender: OutboundSender) {
        tracing::info!("Connection '{}' opened", connection_id);
        self.broadcaster.register(connection_id, sender);
    }

    pub(super) fn join(
        &mut self,
        connection_id: &ConnectionId,
        username: Username,
    ) -> Result<(), RaceError> {
        if !self.broadcaster.contains(connection_id) {
            return Err(RaceError::UnknownConnection(connection_id.to_string()));
        }

        let phase = self.race.phase();
        let role = Role::for_phase(phase);
        let JoinOutcome { session, evicted } =
            self.sessions.join(username, connection_id.clone(), role);

        if let Some(old) = evicted {
            tracing::info!(
                "'{}' joined again from '{}', closing '{}'",
                session.username,
                connection_id,
                old
            );
            self.broadcaster.unicast(
                &old,
                &ServerEvent::DuplicateIdentity {
                    message: DUPLICATE_MESSAGE.to_string(),
                },
            );
            self.broadcaster.close(&old);
            self.progress.remove(&old);
        }
        self.progress.insert_default(connection_id.clone());

        tracing::info!(
            "'{}' joined as {:?} during {}",
            session.username,
            session.role,
            phase
        );

        let is_spectator = session.role.is_spectator();
        self.broadcaster.unicast(
            connection_id,
            &ServerEvent::GameJoined {
                phase,
                is_spectator,
                message: is_spectator.then(|| SPECTATOR_MESSAGE.to_string()),
            },
        );
        if phase == Phase::Playing
            && let Some(event) = self.game_start_event()
        {
            self.broadcaster.unicast(connection_id, &event);
        }
        self.broadcast_roster();

        // 追い出された接続が最後の未完走者だった場合
        self.finish_if_all_done();
        Ok(())
    }

    /// Socket closed. Unknown connections are fine: the socket may never have joined.
    pub(super) fn disconnect(&mut self, connection_id: &ConnectionId) -> Result<(), RaceError> {
        self.broadcaster.unregister(connection_id);
        let Some(session) = self.sessions.remove(connection_id) else {
            tracing::debug!("Connection '{}' closed without a session", connection_id);
            return Ok(());
        };
        self.progress.remove(connection_id);
        tracing::info!("'{}' left ('{}')", session.username, connection_id);

        self.broadcast_roster();
        self.finish_if_all_done();
        Ok(())
    }
}
