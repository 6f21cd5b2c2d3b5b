//! Query Executor
//!
//! Hands a plan to the transport and returns the raw `data` payload.
//! No retries happen here.

use serde_json::Value;
use sonar_core::{SonarResult, Transport};
use tracing::{debug, instrument};

use crate::query::QueryPlan;

#[instrument(skip_all, fields(object = %plan.object_name, paginated = plan.is_paginated()))]
pub async fn fetch<T>(transport: &T, plan: &QueryPlan) -> SonarResult<Value>
where
    T: Transport + ?Sized,
{
    debug!(
        query = %plan.query.query,
        variables = %plan.query.variables,
        "Executing GraphQL query"
    );

    let data = transport
        .execute(&plan.query.query, &plan.query.variables)
        .await?;
    Ok(data)
}
