use crate::{
    models::{CreatePingResultRequest, PingResult, ProbeStatus},
    response::ApiResponse,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::ping_results::create_ping_result,
        crate::handlers::ping_results::list_ping_results,
        crate::handlers::ping_results::latest_up_per_container,
    ),
    components(
        schemas(
            PingResult,
            ProbeStatus,
            CreatePingResultRequest,
            ApiResponse<PingResult>,
        )
    ),
    tags(
        (name = "探测结果", description = "容器探测结果的上报与查询")
    ),
    info(
        title = "FleetProbe Collector API",
        version = "1.0.0",
        description = "容器集群探测结果收集端 REST API 文档"
    )
)]
pub struct ApiDoc;
