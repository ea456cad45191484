use crate::context::AppContext;
use crate::error::AppResult;
use crate::workflow::outline::{OutlineWorkflowOutcome, generate_outline};

#[derive(Debug, Clone)]
pub struct OutlineCommandArgs {
    pub title: Option<String>,
}

pub async fn run(ctx: &AppContext, args: OutlineCommandArgs) -> AppResult<OutlineWorkflowOutcome> {
    generate_outline(ctx, args.title).await
}
