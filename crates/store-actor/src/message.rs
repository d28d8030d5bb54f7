//! # Store Messages
//!
//! Requests sent from a [`ResourceClient`](crate::ResourceClient) to a
//! [`ResourceActor`](crate::ResourceActor).

use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by actors.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Request processed by a `ResourceActor`.
///
/// The variants follow the record store contract:
///
/// - **Create**: put a new record under a store-assigned ID; answers with the stored record.
/// - **Get**: read one record by ID.
/// - **Delete**: remove a record permanently.
/// - **Query**: read every record selected by an [`ActorEntity::Query`].
/// - **Action**: run a record-specific [`ActorEntity::Action`] as one atomic
///   read-modify-write.
#[derive(Debug)]
pub enum ResourceRequest<T: ActorEntity> {
    Create {
        params: T::Create,
        respond_to: Response<T>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<()>,
    },
    Query {
        query: T::Query,
        respond_to: Response<Vec<T>>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
}
