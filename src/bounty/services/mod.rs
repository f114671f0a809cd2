//! Application services for bounty board orchestration.

mod lifecycle;

pub use lifecycle::{
    BountyBoardError, BountyBoardResult, BountyBoardService, CreateTaskRequest,
    SubmitCompletionRequest, TaskFilter,
};
