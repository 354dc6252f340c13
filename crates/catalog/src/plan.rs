// Copyright (c) 2025 woxQAQ
//
// Licensed under the MIT License or Apache License 2.0
// See LICENSE files for details

//! # Execution plans
//!
//! Plan analysis is a collaborator: the catalog resolves the plan table and
//! hands the query to a [`QueryPlanner`]. [`PlanTablePlanner`] is the stock
//! implementation based on `EXPLAIN PLAN`.

use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use xugu_host::{Row, Session, Statement};

use crate::error::{CatalogError, CatalogResult};
use crate::sql::quote_literal;

/// How plans are presented to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PlanStyle {
    /// A tree of plan nodes
    Plan,
    /// The query text annotated by the server
    Query,
}

/// A computed plan
pub trait ExecutionPlan: Send + Sync + fmt::Debug {
    /// The query that was explained
    fn query_string(&self) -> &str;

    /// The statement the plan was read with, if any
    fn plan_query_string(&self) -> Option<&str>;

    fn nodes(&self) -> &[PlanNode];
}

/// One step of a plan
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanNode {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub operation: String,
    pub options: Option<String>,
    pub object_owner: Option<String>,
    pub object_name: Option<String>,
    pub cost: Option<i64>,
    pub cardinality: Option<i64>,
}

impl PlanNode {
    pub fn from_row(row: &Row) -> CatalogResult<Self> {
        Ok(Self {
            id: row.i64("ID").unwrap_or_default(),
            parent_id: row.i64("PARENT_ID"),
            operation: row.string("OPERATION").ok_or_else(|| CatalogError::MissingColumn {
                object: "plan".to_string(),
                column: "OPERATION".to_string(),
            })?,
            options: row.string("OPTIONS"),
            object_owner: row.string("OBJECT_OWNER"),
            object_name: row.string("OBJECT_NAME"),
            cost: row.i64("COST"),
            cardinality: row.i64("CARDINALITY"),
        })
    }
}

/// Explains a query using an existing plan table
#[async_trait]
pub trait QueryPlanner: Send + Sync {
    async fn plan(
        &self,
        session: &mut dyn Session,
        query: &str,
        plan_table: &str,
    ) -> CatalogResult<Box<dyn ExecutionPlan>>;
}

/// Plan read back from a plan table
#[derive(Debug, Clone)]
pub struct PlanTablePlan {
    query: String,
    plan_query: String,
    nodes: Vec<PlanNode>,
}

impl ExecutionPlan for PlanTablePlan {
    fn query_string(&self) -> &str {
        &self.query
    }

    fn plan_query_string(&self) -> Option<&str> {
        Some(&self.plan_query)
    }

    fn nodes(&self) -> &[PlanNode] {
        &self.nodes
    }
}

/// `EXPLAIN PLAN` into the plan table, then read the rows back
#[derive(Debug, Default)]
pub struct PlanTablePlanner {
    next_id: AtomicU64,
}

impl PlanTablePlanner {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QueryPlanner for PlanTablePlanner {
    async fn plan(
        &self,
        session: &mut dyn Session,
        query: &str,
        plan_table: &str,
    ) -> CatalogResult<Box<dyn ExecutionPlan>> {
        let statement_id = format!("XG_{}", self.next_id.fetch_add(1, Ordering::Relaxed) + 1);

        let explain = format!(
            "EXPLAIN PLAN SET STATEMENT_ID='{}' INTO {} FOR {}",
            quote_literal(&statement_id),
            plan_table,
            query
        );
        session
            .execute(&Statement::new(explain))
            .await
            .map_err(|e| CatalogError::sql("Failed to explain query", e))?;

        let plan_query = format!(
            "SELECT * FROM {} WHERE STATEMENT_ID=? ORDER BY ID",
            plan_table
        );
        let rows = session
            .query(&Statement::new(plan_query.clone()).bind(statement_id.as_str()))
            .await
            .map_err(|e| CatalogError::sql("Failed to read plan table", e))?;
        let nodes = rows
            .iter()
            .map(PlanNode::from_row)
            .collect::<CatalogResult<Vec<_>>>()?;

        Ok(Box::new(PlanTablePlan {
            query: query.to_string(),
            plan_query,
            nodes,
        }))
    }
}
