//! Per-task bookkeeping shared by every configuration.
//!
//! [`TaskCore`] holds everything the engine tracks independently of the
//! concrete behavior: identity, duration budget, time completed, the
//! experience descriptor, held leases, and experience earned but not yet
//! committed to the agent.

use std::collections::BTreeMap;

use habitat_agents::Agent;
use habitat_types::{AgentId, SkillType, TaskId};
use habitat_world::Lease;
use tracing::{debug, info};

use crate::error::TaskError;
use crate::experience::ExperienceImpact;

/// Experience earned in one skill during a task.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct PendingExperience {
    /// Points earned.
    points: f64,
    /// Millisols practiced.
    time: f64,
}

/// Engine-owned state of one task.
#[derive(Debug)]
pub struct TaskCore {
    /// Unique identifier.
    id: TaskId,
    /// Display label; not unique.
    name: String,
    /// What the agent is doing right now, for logs.
    description: String,
    /// The agent doing the task.
    agent: AgentId,
    /// Skill, effort and stress descriptor.
    impact: ExperienceImpact,
    /// Duration budget in millisols, if the task has one.
    duration: Option<f64>,
    /// Millisols consumed so far.
    time_completed: f64,
    /// Set on first dispatch; the budget is fixed from then on.
    started: bool,
    /// Terminal flag.
    done: bool,
    /// Leases released when the task ends.
    held: Vec<Box<dyn Lease>>,
    /// Experience awaiting commit at the end of the task.
    pending: BTreeMap<SkillType, PendingExperience>,
    /// Multiplier from another agent teaching this one.
    teaching_modifier: f64,
    /// Reason the task asked to be ended after the current dispatch.
    end_request: Option<String>,
}

impl TaskCore {
    /// Create the core of a task called `name` for `agent`.
    pub fn new(name: impl Into<String>, agent: AgentId, impact: ExperienceImpact) -> Self {
        let name = name.into();
        Self {
            id: TaskId::new(),
            description: name.clone(),
            name,
            agent,
            impact,
            duration: None,
            time_completed: 0.0,
            started: false,
            done: false,
            held: Vec::new(),
            pending: BTreeMap::new(),
            teaching_modifier: 1.0,
            end_request: None,
        }
    }

    /// Builder-style [`Self::set_duration`].
    pub fn with_duration(mut self, duration: f64) -> Result<Self, TaskError> {
        self.set_duration(duration)?;
        Ok(self)
    }

    /// Set the duration budget. Must be positive and finite, and may only be
    /// changed before phases begin executing.
    pub fn set_duration(&mut self, duration: f64) -> Result<(), TaskError> {
        if self.started {
            return Err(TaskError::DurationLocked {
                task: self.name.clone(),
            });
        }
        if !duration.is_finite() || duration <= 0.0 {
            return Err(TaskError::InvalidDuration {
                task: self.name.clone(),
                duration,
            });
        }
        self.duration = Some(duration);
        Ok(())
    }

    /// Task identifier.
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Display label.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Replace the description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// The agent doing the task.
    pub const fn agent(&self) -> AgentId {
        self.agent
    }

    /// Skill, effort and stress descriptor.
    pub const fn impact(&self) -> &ExperienceImpact {
        &self.impact
    }

    /// Whether a zero performance rating stops the task.
    pub const fn is_effort_driven(&self) -> bool {
        self.impact.effort.is_effort_driven()
    }

    /// Duration budget, if any.
    pub const fn duration(&self) -> Option<f64> {
        self.duration
    }

    /// Millisols consumed so far.
    pub const fn time_completed(&self) -> f64 {
        self.time_completed
    }

    /// Budget left, or `None` for open-ended tasks.
    pub fn remaining_budget(&self) -> Option<f64> {
        self.duration
            .map(|duration| (duration - self.time_completed).max(0.0))
    }

    /// Whether phases have begun executing.
    pub const fn is_started(&self) -> bool {
        self.started
    }

    /// Whether the task has ended.
    pub const fn is_done(&self) -> bool {
        self.done
    }

    /// Number of leases still registered.
    pub fn held_count(&self) -> usize {
        self.held.len()
    }

    /// Teaching multiplier applied to experience.
    pub const fn teaching_modifier(&self) -> f64 {
        self.teaching_modifier
    }

    /// Record that `teacher` is teaching `learner` during this task.
    pub fn set_teacher(&mut self, teacher: &Agent, learner: &Agent) {
        self.teaching_modifier = teacher.teaching_modifier_for(learner);
    }

    /// Register a lease to be released when the task ends.
    pub fn hold(&mut self, lease: Box<dyn Lease>) {
        debug!(task = %self.name, lease = %lease.label(), "lease registered");
        self.held.push(lease);
    }

    /// Ask the engine to end the task after the current dispatch.
    pub fn request_end(&mut self, reason: impl Into<String>) {
        if self.end_request.is_none() {
            self.end_request = Some(reason.into());
        }
    }

    /// Experience points awaiting commit for `skill`.
    pub fn pending_experience(&self, skill: SkillType) -> f64 {
        self.pending.get(&skill).map_or(0.0, |p| p.points)
    }

    /// Accrue experience to be committed when the task ends.
    pub fn accrue_experience(&mut self, skill: SkillType, points: f64, time: f64) {
        if !points.is_finite() || !time.is_finite() || points < 0.0 || time < 0.0 {
            return;
        }
        let entry = self.pending.entry(skill).or_default();
        entry.points += points;
        entry.time += time;
    }

    // --- Engine-only mutators ---------------------------------------------

    /// Mark phases as started, fixing the budget.
    pub(crate) const fn mark_started(&mut self) {
        self.started = true;
    }

    /// Add consumed time.
    pub(crate) fn add_time(&mut self, time: f64) {
        self.time_completed += time;
    }

    /// Take a pending end request.
    pub(crate) const fn take_end_request(&mut self) -> Option<String> {
        self.end_request.take()
    }

    /// Mark the task done. Returns `false` if it already was.
    pub(crate) const fn mark_done(&mut self) -> bool {
        if self.done {
            return false;
        }
        self.done = true;
        true
    }

    /// Release every held lease exactly once and forget them.
    pub(crate) fn release_all(&mut self) {
        for mut lease in self.held.drain(..) {
            if lease.release() {
                debug!(task = %self.name, lease = %lease.label(), "lease released");
            }
        }
    }

    /// Move pending experience into the agent's skills.
    pub(crate) fn commit_experience(&mut self, agent: &mut Agent) {
        for (skill, earned) in std::mem::take(&mut self.pending) {
            match agent.skills.add_experience(skill, earned.points, earned.time) {
                Ok(Some(level)) => {
                    info!(agent = %agent.name, skill = ?skill, level, "skill level up");
                }
                Ok(None) => {}
                Err(e) => {
                    debug!(agent = %agent.name, error = %e, "experience discarded");
                }
            }
        }
    }
}
