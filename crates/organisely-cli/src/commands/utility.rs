use super::{print_json, CmdResult, Context};

pub async fn health(ctx: &Context) -> CmdResult {
    let response = ctx.client()?.health_check().await?;
    print_json(&response.data)
}

pub async fn version(ctx: &Context) -> CmdResult {
    let response = ctx.client()?.get_api_version().await?;
    print_json(&response.data)
}
