//! Workflow execution engine
//!
//! Traverses a workflow from its entry nodes with a FIFO readiness loop: a
//! node runs once every source of its incoming edges has run, otherwise it
//! goes to the back of the queue. Nodes the traversal never reaches (no path
//! from an entry node, or caught in a cycle) are run afterwards in insertion
//! order by a fallback sweep that ignores dependencies.

use futures::FutureExt;
use serde_json::json;
use std::any::Any;
use std::collections::{HashSet, VecDeque};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;

use super::model::Workflow;
use super::types::Node;
use crate::exoworks::workflow::context::ExecutionContext;
use crate::exoworks::workflow::log::{
    ExecutionResult, LogEntry, LogLevel, EXECUTION_NODE_ID, VALIDATION_NODE_ID,
};
use crate::exoworks::workflow::registry::NodeRegistry;
use crate::exoworks::workflow::types::NodeType;
use crate::sdk::effect::EffectSimulator;
use crate::sdk::error::ExoError;

/// Accumulates the entries of one run and mirrors them to an optional sink
struct RunLog<'a> {
    entries: Vec<LogEntry>,
    sink: Option<&'a mpsc::Sender<LogEntry>>,
}

impl<'a> RunLog<'a> {
    fn new(sink: Option<&'a mpsc::Sender<LogEntry>>) -> Self {
        Self {
            entries: Vec::new(),
            sink,
        }
    }

    async fn push(&mut self, entry: LogEntry) {
        if let Some(tx) = self.sink {
            // A dropped receiver only stops the mirror, never the run
            let _ = tx.send(entry.clone()).await;
        }
        self.entries.push(entry);
    }

    fn into_entries(self) -> Vec<LogEntry> {
        self.entries
    }
}

/// Runs workflows by dispatching each node to its registered handler
#[derive(Clone)]
pub struct ExecutionEngine {
    registry: NodeRegistry,
}

impl ExecutionEngine {
    pub fn new(registry: NodeRegistry) -> Self {
        Self { registry }
    }

    /// An engine with the built-in handlers backed by `simulator`
    pub fn with_simulator(simulator: Arc<dyn EffectSimulator>) -> Self {
        Self::new(NodeRegistry::with_defaults(simulator))
    }

    /// Execute a workflow. Never fails: every failure is folded into the
    /// returned result.
    pub async fn run(&self, workflow: &Workflow, context: ExecutionContext) -> ExecutionResult {
        self.execute(workflow, context, None).await
    }

    /// Execute a workflow, also sending every log entry to `tx` as soon as it
    /// is produced. The returned result holds the same entries.
    pub async fn run_stream(
        &self,
        workflow: &Workflow,
        context: ExecutionContext,
        tx: mpsc::Sender<LogEntry>,
    ) -> ExecutionResult {
        self.execute(workflow, context, Some(&tx)).await
    }

    async fn execute(
        &self,
        workflow: &Workflow,
        context: ExecutionContext,
        sink: Option<&mpsc::Sender<LogEntry>>,
    ) -> ExecutionResult {
        let mut run = RunLog::new(sink);

        let report = workflow.validate();
        if !report.valid {
            let summary = report.summary();
            log::warn!("Workflow '{}' failed validation: {}", workflow.id, summary);
            run.push(LogEntry::new(
                VALIDATION_NODE_ID,
                NodeType::Custom,
                LogLevel::Error,
                format!("Workflow validation failed: {}", summary),
            ))
            .await;
            return ExecutionResult {
                success: false,
                logs: run.into_entries(),
                final_context: context,
                error: Some(summary),
            };
        }

        log::info!(
            "Running workflow '{}' with {} nodes and {} edges",
            workflow.id,
            workflow.nodes().len(),
            workflow.edges().len()
        );
        self.run_validated(workflow, context, run).await
    }

    /// Traverse an already validated workflow. An engine error keeps the
    /// entries logged so far and appends an `execution` error entry.
    async fn run_validated(
        &self,
        workflow: &Workflow,
        mut context: ExecutionContext,
        mut run: RunLog<'_>,
    ) -> ExecutionResult {
        match self.traverse(workflow, &mut context, &mut run).await {
            Ok(()) => {
                log::info!("Workflow '{}' completed", workflow.id);
                ExecutionResult {
                    success: true,
                    logs: run.into_entries(),
                    final_context: context,
                    error: None,
                }
            }
            Err(e) => {
                let message = e.to_string();
                log::error!("Workflow '{}' aborted: {}", workflow.id, message);
                run.push(
                    LogEntry::new(
                        EXECUTION_NODE_ID,
                        NodeType::Custom,
                        LogLevel::Error,
                        message.clone(),
                    )
                    .with_data(json!({ "error": message })),
                )
                .await;
                ExecutionResult {
                    success: false,
                    logs: run.into_entries(),
                    final_context: context,
                    error: Some(message),
                }
            }
        }
    }

    async fn traverse(
        &self,
        workflow: &Workflow,
        context: &mut ExecutionContext,
        run: &mut RunLog<'_>,
    ) -> Result<(), ExoError> {
        let entry_nodes = workflow.entry_nodes();
        if entry_nodes.is_empty() && !workflow.nodes().is_empty() {
            run.push(LogEntry::new(
                EXECUTION_NODE_ID,
                NodeType::Custom,
                LogLevel::Warning,
                "No entry nodes found in workflow",
            ))
            .await;
        }

        let mut queue: VecDeque<&Node> = entry_nodes.into_iter().collect();
        let mut executed: HashSet<&str> = HashSet::new();
        // Requeues since a node last executed
        let mut stalled = 0usize;

        while let Some(node) = queue.pop_front() {
            if executed.contains(node.id.as_str()) {
                continue;
            }

            if !dependencies_satisfied(workflow, node, &executed) {
                queue.push_back(node);
                stalled += 1;
                // Every queued entry has been requeued since the last
                // execution, and readiness only changes when a node runs.
                if stalled >= queue.len() {
                    log::warn!(
                        "{} queued nodes wait on dependencies that cannot run; \
                         handing them to the fallback sweep",
                        queue.len()
                    );
                    break;
                }
                continue;
            }

            self.run_node(node, context, run).await;
            executed.insert(node.id.as_str());
            stalled = 0;

            for edge in workflow.outgoing_edges(&node.id) {
                let target = workflow.get_node(&edge.target_id).ok_or_else(|| {
                    ExoError::engine(format!(
                        "Edge {} points at unknown node {}",
                        edge.id, edge.target_id
                    ))
                })?;
                if !executed.contains(target.id.as_str()) {
                    queue.push_back(target);
                }
            }
        }

        for node in workflow.nodes() {
            if executed.contains(node.id.as_str()) {
                continue;
            }
            log::info!("Node {} was not reached, running it in the fallback sweep", node.id);
            self.run_node(node, context, run).await;
            executed.insert(node.id.as_str());
        }

        Ok(())
    }

    /// Execute a single node, recovering from handler errors and panics
    async fn run_node(&self, node: &Node, context: &mut ExecutionContext, run: &mut RunLog<'_>) {
        let node_type = node.node_type();
        log::info!("Executing node: {} ({})", node.id, node_type);

        run.push(LogEntry::new(
            &node.id,
            node_type.clone(),
            LogLevel::Info,
            format!("Executing node: {}", node.label),
        ))
        .await;

        let logs = match self.registry.get(&node_type).await {
            None => {
                log::warn!("No handler for node type '{}'", node_type);
                let message = format!("Unknown node type: {}", node_type);
                vec![LogEntry::new(&node.id, node_type, LogLevel::Warning, message)]
            }
            Some(handler) => {
                match AssertUnwindSafe(handler.execute(node, context))
                    .catch_unwind()
                    .await
                {
                    Ok(Ok(logs)) => logs,
                    Ok(Err(e)) => {
                        log::error!("Node {} failed: {}", node.id, e);
                        vec![node_failure(node, e.to_string())]
                    }
                    Err(panic) => {
                        let message = panic_message(panic.as_ref());
                        log::error!("Node {} panicked: {}", node.id, message);
                        vec![node_failure(node, message)]
                    }
                }
            }
        };

        for entry in logs {
            run.push(entry).await;
        }
    }
}

/// True when every source of the node's incoming edges has executed.
/// Nodes without incoming edges are always ready.
fn dependencies_satisfied(workflow: &Workflow, node: &Node, executed: &HashSet<&str>) -> bool {
    workflow
        .incoming_edges(&node.id)
        .all(|e| executed.contains(e.source_id.as_str()))
}

fn node_failure(node: &Node, message: String) -> LogEntry {
    LogEntry::new(
        &node.id,
        node.node_type(),
        LogLevel::Error,
        format!("Error executing node: {}", message),
    )
    .with_data(json!({ "error": message }))
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown error".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exoworks::mock::MockSolana;
    use crate::exoworks::workflow::graph::{Edge, Node};
    use crate::exoworks::workflow::registry::NodeHandler;
    use crate::exoworks::workflow::types::{AlertConfig, NodeConfig};
    use async_trait::async_trait;
    use serde_json::{Map, Value};
    use std::sync::Mutex;

    /// Handler that records the order in which nodes run
    struct RecordingHandler {
        order: Arc<Mutex<Vec<String>>>,
    }

    impl RecordingHandler {
        fn new() -> (Self, Arc<Mutex<Vec<String>>>) {
            let order = Arc::new(Mutex::new(Vec::new()));
            (
                Self {
                    order: order.clone(),
                },
                order,
            )
        }
    }

    #[async_trait]
    impl NodeHandler for RecordingHandler {
        async fn execute(
            &self,
            node: &Node,
            _context: &mut ExecutionContext,
        ) -> Result<Vec<LogEntry>, ExoError> {
            self.order.lock().unwrap().push(node.id.clone());
            Ok(vec![LogEntry::new(
                &node.id,
                node.node_type(),
                LogLevel::Info,
                format!("ran {}", node.id),
            )])
        }
    }

    /// Handler that fails for one node id and panics for another
    struct FaultyHandler;

    #[async_trait]
    impl NodeHandler for FaultyHandler {
        async fn execute(
            &self,
            node: &Node,
            context: &mut ExecutionContext,
        ) -> Result<Vec<LogEntry>, ExoError> {
            match node.id.as_str() {
                "fail" => Err(ExoError::handler("insufficient funds")),
                "panic" => panic!("handler blew up"),
                _ => {
                    context.set(format!("seen.{}", node.id), Value::Bool(true));
                    Ok(vec![])
                }
            }
        }
    }

    fn custom(id: &str) -> Node {
        Node::new(id, id.to_uppercase(), NodeConfig::Custom(Map::new()))
    }

    async fn recording_engine() -> (ExecutionEngine, Arc<Mutex<Vec<String>>>) {
        let (handler, order) = RecordingHandler::new();
        let registry = NodeRegistry::new();
        registry.register(NodeType::Custom, Arc::new(handler)).await;
        (ExecutionEngine::new(registry), order)
    }

    fn workflow(nodes: &[&str], edges: &[(&str, &str)]) -> Workflow {
        let mut wf = Workflow::new("wf", "test");
        for id in nodes {
            wf.add_node(custom(id)).unwrap();
        }
        for (i, (from, to)) in edges.iter().enumerate() {
            wf.add_edge(Edge::new(format!("e{}", i), *from, *to)).unwrap();
        }
        wf
    }

    fn first_index(result: &ExecutionResult, node_id: &str) -> usize {
        result.logs.iter().position(|e| e.node_id == node_id).unwrap()
    }

    fn last_index(result: &ExecutionResult, node_id: &str) -> usize {
        result.logs.iter().rposition(|e| e.node_id == node_id).unwrap()
    }

    #[tokio::test]
    async fn test_chain_runs_in_order() {
        let (engine, order) = recording_engine().await;
        let wf = workflow(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);

        let result = engine.run(&wf, ExecutionContext::new("wf")).await;

        assert!(result.success);
        assert_eq!(*order.lock().unwrap(), vec!["a", "b", "c"]);
        assert!(last_index(&result, "a") < first_index(&result, "b"));
        assert!(last_index(&result, "b") < first_index(&result, "c"));
    }

    #[tokio::test]
    async fn test_executing_entry_comes_first() {
        let (engine, _) = recording_engine().await;
        let wf = workflow(&["a"], &[]);

        let result = engine.run(&wf, ExecutionContext::new("wf")).await;

        assert_eq!(result.logs.len(), 2);
        assert_eq!(result.logs[0].level, LogLevel::Info);
        assert_eq!(result.logs[0].message, "Executing node: A");
        assert_eq!(result.logs[1].message, "ran a");
    }

    #[tokio::test]
    async fn test_join_waits_for_both_predecessors() {
        let (engine, order) = recording_engine().await;
        // a -> x -> join, b -> join: join is reached from b before x has run
        let wf = workflow(
            &["a", "b", "x", "join"],
            &[("a", "x"), ("x", "join"), ("b", "join")],
        );

        let result = engine.run(&wf, ExecutionContext::new("wf")).await;

        assert!(result.success);
        let order = order.lock().unwrap().clone();
        assert_eq!(order.len(), 4);
        assert_eq!(order.last().map(String::as_str), Some("join"));
        let join = first_index(&result, "join");
        assert!(last_index(&result, "x") < join);
        assert!(last_index(&result, "b") < join);
    }

    #[tokio::test]
    async fn test_node_runs_once_with_many_predecessors() {
        let (engine, order) = recording_engine().await;
        let wf = workflow(
            &["a", "b", "c", "sink"],
            &[("a", "sink"), ("b", "sink"), ("c", "sink")],
        );

        engine.run(&wf, ExecutionContext::new("wf")).await;

        let order = order.lock().unwrap();
        assert_eq!(order.iter().filter(|id| *id == "sink").count(), 1);
        assert_eq!(*order, vec!["a", "b", "c", "sink"]);
    }

    #[tokio::test]
    async fn test_cycle_without_entry_runs_via_fallback() {
        let (engine, order) = recording_engine().await;
        let wf = workflow(&["a", "b"], &[("a", "b"), ("b", "a")]);

        let result = engine.run(&wf, ExecutionContext::new("wf")).await;

        assert!(result.success);
        assert_eq!(result.logs[0].level, LogLevel::Warning);
        assert_eq!(result.logs[0].node_id, EXECUTION_NODE_ID);
        assert_eq!(result.logs[0].message, "No entry nodes found in workflow");
        assert_eq!(*order.lock().unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_dependency_on_cycle_does_not_spin() {
        let (engine, order) = recording_engine().await;
        // entry -> gate <- c1 <-> c2; gate can never become ready
        let wf = workflow(
            &["entry", "gate", "c1", "c2"],
            &[("entry", "gate"), ("c1", "gate"), ("c1", "c2"), ("c2", "c1")],
        );

        let result = engine.run(&wf, ExecutionContext::new("wf")).await;

        assert!(result.success);
        assert_eq!(*order.lock().unwrap(), vec!["entry", "gate", "c1", "c2"]);
    }

    #[tokio::test]
    async fn test_validation_failure_runs_nothing() {
        let (engine, order) = recording_engine().await;
        let wf = Workflow::from_parts(
            "wf",
            "broken",
            vec![custom("a"), custom("a")],
            vec![Edge::new("e1", "a", "ghost"), Edge::new("e1", "a", "a")],
        );

        let result = engine.run(&wf, ExecutionContext::new("wf")).await;

        assert!(!result.success);
        assert!(order.lock().unwrap().is_empty());
        assert_eq!(result.logs.len(), 1);
        assert_eq!(result.logs[0].node_id, VALIDATION_NODE_ID);
        assert_eq!(result.logs[0].level, LogLevel::Error);
        assert_eq!(
            result.error.as_deref(),
            Some(
                "Duplicate node ID: a, Duplicate edge ID: e1, \
                 Edge e1 references non-existent target node: ghost"
            )
        );
        assert!(result.logs[0]
            .message
            .starts_with("Workflow validation failed: Duplicate node ID: a"));
    }

    #[tokio::test]
    async fn test_handler_failures_are_contained() {
        let registry = NodeRegistry::new();
        registry.register(NodeType::Custom, Arc::new(FaultyHandler)).await;
        let engine = ExecutionEngine::new(registry);
        let wf = workflow(&["fail", "panic", "ok"], &[("fail", "panic"), ("panic", "ok")]);

        let result = engine.run(&wf, ExecutionContext::new("wf")).await;

        assert!(result.success);
        let errors: Vec<_> = result.logs_at(LogLevel::Error).collect();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].node_id, "fail");
        assert_eq!(errors[0].message, "Error executing node: insufficient funds");
        assert_eq!(errors[0].data, Some(json!({"error": "insufficient funds"})));
        assert_eq!(errors[1].node_id, "panic");
        assert_eq!(errors[1].message, "Error executing node: handler blew up");
        assert_eq!(
            result.final_context.get("seen.ok"),
            Some(&Value::Bool(true))
        );
    }

    #[tokio::test]
    async fn test_unknown_type_logs_warning_and_continues() {
        let (engine, order) = recording_engine().await;
        let mut wf = workflow(&["a"], &[]);
        let bridge = Node::from_document(
            "bridge",
            NodeType::Other("bridge".into()),
            "Bridge",
            json!({"chain": "eth"}),
        )
        .unwrap();
        wf.add_node(bridge).unwrap();
        wf.add_edge(Edge::new("e9", "bridge", "a")).unwrap();

        let result = engine.run(&wf, ExecutionContext::new("wf")).await;

        assert!(result.success);
        let warning = result
            .logs
            .iter()
            .find(|e| e.level == LogLevel::Warning)
            .unwrap();
        assert_eq!(warning.node_id, "bridge");
        assert_eq!(warning.message, "Unknown node type: bridge");
        assert_eq!(*order.lock().unwrap(), vec!["a"]);
    }

    #[tokio::test]
    async fn test_empty_workflow_succeeds_silently() {
        let (engine, _) = recording_engine().await;
        let wf = Workflow::new("wf", "empty");

        let result = engine.run(&wf, ExecutionContext::new("wf")).await;

        assert!(result.success);
        assert!(result.logs.is_empty());
    }

    #[tokio::test]
    async fn test_run_stream_mirrors_result() {
        let engine = ExecutionEngine::with_simulator(Arc::new(MockSolana::instant()));
        let mut wf = Workflow::new("wf", "stream");
        wf.add_node(Node::new(
            "alert",
            "Alert: hi",
            NodeConfig::Alert(AlertConfig {
                message: Some("hi".into()),
            }),
        ))
        .unwrap();
        wf.add_node(custom("after")).unwrap();
        wf.add_edge(Edge::new("e1", "alert", "after")).unwrap();

        let (tx, mut rx) = mpsc::channel(64);
        let result = engine.run_stream(&wf, ExecutionContext::new("wf"), tx).await;

        let mut streamed = Vec::new();
        while let Some(entry) = rx.recv().await {
            streamed.push(entry);
        }
        assert_eq!(streamed, result.logs);
        assert_eq!(streamed.len(), 4);
    }

    #[tokio::test]
    async fn test_run_stream_survives_dropped_receiver() {
        let (engine, _) = recording_engine().await;
        let wf = workflow(&["a", "b"], &[("a", "b")]);
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        let result = engine.run_stream(&wf, ExecutionContext::new("wf"), tx).await;
        assert!(result.success);
        assert_eq!(result.logs.len(), 4);
    }

    #[tokio::test]
    async fn test_engine_error_keeps_partial_logs() {
        let (engine, order) = recording_engine().await;
        // from_parts skips the checks add_edge performs
        let wf = Workflow::from_parts(
            "wf",
            "broken",
            vec![custom("a"), custom("b")],
            vec![Edge::new("e1", "a", "ghost"), Edge::new("e2", "a", "b")],
        );

        let (tx, mut rx) = mpsc::channel(16);
        let result = engine
            .run_validated(&wf, ExecutionContext::new("wf"), RunLog::new(Some(&tx)))
            .await;
        drop(tx);

        let message = "Engine error: Edge e1 points at unknown node ghost";
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some(message));
        assert_eq!(*order.lock().unwrap(), vec!["a"]);

        assert_eq!(result.logs.len(), 3);
        assert_eq!(result.logs[0].message, "Executing node: A");
        assert_eq!(result.logs[1].message, "ran a");
        let last = &result.logs[2];
        assert_eq!(last.node_id, EXECUTION_NODE_ID);
        assert_eq!(last.level, LogLevel::Error);
        assert_eq!(last.message, message);
        assert_eq!(last.data, Some(json!({ "error": message })));

        let mut streamed = Vec::new();
        while let Some(entry) = rx.recv().await {
            streamed.push(entry);
        }
        assert_eq!(streamed.len(), 3);
        assert_eq!(streamed[2].node_id, EXECUTION_NODE_ID);
    }

    #[test]
    fn test_panic_message_extraction() {
        let boxed: Box<dyn Any + Send> = Box::new("static str");
        assert_eq!(panic_message(boxed.as_ref()), "static str");

        let boxed: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(boxed.as_ref()), "owned");

        let boxed: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(boxed.as_ref()), "Unknown error");
    }
}
