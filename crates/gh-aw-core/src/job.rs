//! GitHub Actions job specification (spec.md §3 `JobSpec`).
//!
//! Created once per compilation by the Job Graph Builder (pass 7) and never
//! mutated after graph emission begins — the same "build the full struct,
//! then only read it" discipline the teacher's `ExecutionPlan`/`PlanStep`
//! pair uses for its own compiled output.

use crate::value::{Map, Value};

/// A single step within a job (an action invocation or a `run:` block).
#[derive(Debug, Clone)]
pub struct StepSpec {
    pub name: Option<String>,
    pub id: Option<String>,
    pub uses: Option<String>,
    pub run: Option<String>,
    pub with: Map,
    pub env: Map,
    pub r#if: Option<String>,
}

impl StepSpec {
    pub fn run(run: impl Into<String>) -> Self {
        Self {
            name: None,
            id: None,
            uses: None,
            run: Some(run.into()),
            with: Map::new(),
            env: Map::new(),
            r#if: None,
        }
    }

    pub fn uses(action: impl Into<String>) -> Self {
        Self {
            name: None,
            id: None,
            uses: Some(action.into()),
            run: None,
            with: Map::new(),
            env: Map::new(),
            r#if: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), Value::String(value.into()));
        self
    }

    pub fn with_input(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.with.insert(key.into(), Value::String(value.into()));
        self
    }
}

/// A single GitHub Actions job in the generated workflow's job graph.
#[derive(Debug, Clone)]
pub struct JobSpec {
    pub name: String,
    pub runs_on: String,
    pub permissions: Map,
    pub needs: Vec<String>,
    pub r#if: Option<String>,
    pub outputs: Map,
    pub env: Map,
    pub steps: Vec<StepSpec>,
    pub timeout_minutes: Option<i64>,
    pub concurrency: Option<Value>,
}

impl JobSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            runs_on: "ubuntu-latest".to_string(),
            permissions: Map::new(),
            needs: Vec::new(),
            r#if: None,
            outputs: Map::new(),
            env: Map::new(),
            steps: Vec::new(),
            timeout_minutes: None,
            concurrency: None,
        }
    }

    pub fn needs(mut self, job: impl Into<String>) -> Self {
        self.needs.push(job.into());
        self
    }

    pub fn when(mut self, condition: impl Into<String>) -> Self {
        self.r#if = Some(condition.into());
        self
    }

    pub fn permission(mut self, scope: impl Into<String>, level: impl Into<String>) -> Self {
        self.permissions
            .insert(scope.into(), Value::String(level.into()));
        self
    }

    pub fn step(mut self, step: StepSpec) -> Self {
        self.steps.push(step);
        self
    }

    pub fn timeout(mut self, minutes: i64) -> Self {
        self.timeout_minutes = Some(minutes);
        self
    }
}
