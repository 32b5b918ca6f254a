//! Request dispatch - role checks and session calls for each request

use crate::error::{FarmingError, UNAVAILABLE_MESSAGE};
use crate::protocol::{check_version_compatibility, Caller, Request, Response, PROTOCOL_VERSION};
use crate::session::SessionService;
use std::sync::Arc;
use tokio::sync::Notify;
use uuid::Uuid;

/// Gate for privileged commands: the caller must hold the configured role.
#[derive(Debug, Clone)]
pub struct RoleGate {
    privileged_role: String,
}

impl RoleGate {
    pub fn new(privileged_role: impl Into<String>) -> Self {
        Self {
            privileged_role: privileged_role.into(),
        }
    }

    pub fn authorize(&self, caller: &Caller) -> Result<(), FarmingError> {
        if caller.has_role(&self.privileged_role) {
            Ok(())
        } else {
            Err(FarmingError::PermissionDenied {
                user_id: caller.user_id.clone(),
            })
        }
    }
}

/// State shared by every connection
pub(crate) struct ServerContext {
    pub server_id: Uuid,
    pub service: Arc<SessionService>,
    pub gate: RoleGate,
    pub shutdown: Notify,
}

/// Process a client request and build the response
pub(crate) async fn process_request(
    request: Request,
    client_id: Uuid,
    ctx: &ServerContext,
) -> Response {
    tracing::debug!("Client {} sent {}", client_id, request.name());

    match request {
        Request::Hello { protocol_version } => {
            match check_version_compatibility(protocol_version, PROTOCOL_VERSION) {
                Ok(()) => Response::Ack {
                    for_command: "Hello".to_string(),
                },
                Err(e) => Response::Error {
                    message: e.to_string(),
                },
            }
        }

        Request::Ping => Response::Pong {
            timestamp: chrono::Utc::now().timestamp_millis(),
        },

        Request::Create { caller } => {
            if let Err(e) = ctx.gate.authorize(&caller) {
                return error_response(&e);
            }
            let creator = caller.user_id;
            call(ctx, move |service| service.create(&creator))
                .await
                .map(|code| Response::Created { code })
                .unwrap_or_else(|r| r)
        }

        Request::Join {
            caller,
            code,
            nickname,
        } => {
            let joined = (code.clone(), nickname.clone());
            call(ctx, move |service| {
                service.join(&code, &caller.user_id, &nickname)
            })
            .await
            .map(|()| Response::Joined {
                code: joined.0,
                nickname: joined.1,
            })
            .unwrap_or_else(|r| r)
        }

        Request::Close { caller, code } => {
            if let Err(e) = ctx.gate.authorize(&caller) {
                return error_response(&e);
            }
            let closed = code.clone();
            call(ctx, move |service| service.close(&code, &caller.user_id))
                .await
                .map(|()| Response::Closed { code: closed })
                .unwrap_or_else(|r| r)
        }

        Request::View { code } => call(ctx, move |service| service.view(&code))
            .await
            .map(Response::Roster)
            .unwrap_or_else(|r| r),

        Request::List { code } => {
            let listed = code.clone();
            call(ctx, move |service| service.randomized_list(&code))
                .await
                .map(|nicknames| Response::Order {
                    code: listed,
                    nicknames,
                })
                .unwrap_or_else(|r| r)
        }

        Request::Shutdown { caller } => {
            if let Err(e) = ctx.gate.authorize(&caller) {
                return error_response(&e);
            }
            tracing::info!("Client {} requested shutdown", client_id);
            ctx.shutdown.notify_one();
            Response::Ack {
                for_command: "Shutdown".to_string(),
            }
        }
    }
}

/// Run a blocking session operation off the async workers.
async fn call<T, F>(ctx: &ServerContext, op: F) -> Result<T, Response>
where
    F: FnOnce(&SessionService) -> crate::error::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let service = Arc::clone(&ctx.service);
    match tokio::task::spawn_blocking(move || op(&service)).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(error_response(&e)),
        Err(e) => {
            tracing::error!("Session task failed: {}", e);
            Err(Response::Failed {
                message: UNAVAILABLE_MESSAGE.to_string(),
            })
        }
    }
}

fn error_response(err: &FarmingError) -> Response {
    let message = err.user_message().to_string();
    match err {
        FarmingError::PermissionDenied { .. } => {
            tracing::warn!("Rejected privileged command: {}", err);
            Response::Rejected { message }
        }
        _ if err.is_user_facing() => {
            tracing::debug!("Rejected request: {}", err);
            Response::Rejected { message }
        }
        _ => {
            tracing::error!("Session operation failed: {}", err);
            Response::Failed { message }
        }
    }
}
