//! Recording runtime for tests that must not touch a real container engine.

use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::path::{Path, PathBuf};

use sitepub_core::{CommandError, ContainerId, ExecOutput, ImageSpec, ImageTag};

use crate::runtime::{ContainerRuntime, CreateRequest};

/// One call received by [`MockRuntime`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapturedCall {
    BuildImage { tag: ImageTag },
    Create { image: ImageTag, project_root: PathBuf },
    Start { id: ContainerId },
    Exec {
        id: ContainerId,
        workdir: PathBuf,
        script: String,
    },
    Remove { id: ContainerId },
}

/// Runtime operations a [`MockRuntime`] can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    BuildImage,
    Create,
    Start,
    Exec,
    Remove,
}

type ExecHook = Box<dyn FnMut(&Path, &str)>;

/// In-memory [`ContainerRuntime`] that records every call.
///
/// `exec` returns queued results in order and a zero exit once the queue is
/// empty. An optional hook runs on every `exec`, letting tests stand in for
/// the generator by writing files.
pub struct MockRuntime {
    container_id: String,
    calls: RefCell<Vec<CapturedCall>>,
    failures: HashSet<Operation>,
    exec_results: RefCell<VecDeque<ExecOutput>>,
    exec_hook: RefCell<Option<ExecHook>>,
}

impl Default for MockRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MockRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockRuntime")
            .field("container_id", &self.container_id)
            .field("calls", &self.calls.borrow())
            .field("failures", &self.failures)
            .finish_non_exhaustive()
    }
}

impl MockRuntime {
    pub fn new() -> Self {
        Self {
            container_id: "mock-container".to_string(),
            calls: RefCell::new(Vec::new()),
            failures: HashSet::new(),
            exec_results: RefCell::new(VecDeque::new()),
            exec_hook: RefCell::new(None),
        }
    }

    pub fn with_container_id(mut self, id: &str) -> Self {
        self.container_id = id.to_string();
        self
    }

    pub fn fail_on(mut self, op: Operation) -> Self {
        self.failures.insert(op);
        self
    }

    pub fn push_exec_result(self, output: ExecOutput) -> Self {
        self.exec_results.borrow_mut().push_back(output);
        self
    }

    pub fn on_exec(self, hook: impl FnMut(&Path, &str) + 'static) -> Self {
        *self.exec_hook.borrow_mut() = Some(Box::new(hook));
        self
    }

    pub fn calls(&self) -> Vec<CapturedCall> {
        self.calls.borrow().clone()
    }

    /// Ids passed to `remove`, in call order.
    pub fn removed(&self) -> Vec<ContainerId> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                CapturedCall::Remove { id } => Some(id.clone()),
                _ => None,
            })
            .collect()
    }

    /// Scripts passed to `exec`, in call order.
    pub fn scripts(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|call| match call {
                CapturedCall::Exec { script, .. } => Some(script.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: CapturedCall, op: Operation) -> Result<(), CommandError> {
        self.calls.borrow_mut().push(call);
        if self.failures.contains(&op) {
            return Err(CommandError::Failed {
                command: format!("mock {op:?}"),
                status: "1".to_string(),
                detail: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

impl ContainerRuntime for MockRuntime {
    fn build_image(&self, spec: &ImageSpec) -> Result<(), CommandError> {
        self.record(
            CapturedCall::BuildImage {
                tag: spec.tag.clone(),
            },
            Operation::BuildImage,
        )
    }

    fn create(&self, request: &CreateRequest) -> Result<ContainerId, CommandError> {
        self.record(
            CapturedCall::Create {
                image: request.image.clone(),
                project_root: request.project_root.clone(),
            },
            Operation::Create,
        )?;
        Ok(ContainerId::from(self.container_id.as_str()))
    }

    fn start(&self, id: &ContainerId) -> Result<(), CommandError> {
        self.record(CapturedCall::Start { id: id.clone() }, Operation::Start)
    }

    fn exec(
        &self,
        id: &ContainerId,
        workdir: &Path,
        script: &str,
    ) -> Result<ExecOutput, CommandError> {
        self.record(
            CapturedCall::Exec {
                id: id.clone(),
                workdir: workdir.to_path_buf(),
                script: script.to_string(),
            },
            Operation::Exec,
        )?;
        if let Some(hook) = self.exec_hook.borrow_mut().as_mut() {
            hook(workdir, script);
        }
        Ok(self
            .exec_results
            .borrow_mut()
            .pop_front()
            .unwrap_or(ExecOutput {
                code: Some(0),
                stdout: String::new(),
                stderr: String::new(),
            }))
    }

    fn remove(&self, id: &ContainerId) -> Result<(), CommandError> {
        self.record(CapturedCall::Remove { id: id.clone() }, Operation::Remove)
    }
}
