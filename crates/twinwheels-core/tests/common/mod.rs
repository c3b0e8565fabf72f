// Recording audio backend shared by the integration tests.
// Every node operation is logged; lifecycle violations (a second stop, a
// write to a stopped chain) are collected instead of panicking so tests can
// assert on them.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use twinwheels_core::{AudioError, AudioGraph, VoiceChain, VoiceParam};

#[derive(Clone, Debug, PartialEq)]
pub enum Op {
    Create {
        chain: usize,
    },
    Start {
        chain: usize,
        when: f64,
    },
    Stop {
        chain: usize,
    },
    Target {
        chain: usize,
        param: VoiceParam,
        value: f32,
    },
    Ramp {
        chain: usize,
        param: VoiceParam,
        from: f32,
        to: f32,
        duration: f64,
    },
    Release {
        chain: usize,
    },
}

#[derive(Default)]
struct Recorder {
    ops: Vec<Op>,
    violations: Vec<String>,
    stopped: Vec<bool>,
    fail_create: bool,
}

#[derive(Clone, Default)]
pub struct RecordingGraph {
    inner: Rc<RefCell<Recorder>>,
    clock: Rc<Cell<f64>>,
}

impl RecordingGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_time(&self, t: f64) {
        self.clock.set(t);
    }

    pub fn fail_next_creates(&self, fail: bool) {
        self.inner.borrow_mut().fail_create = fail;
    }

    pub fn ops(&self) -> Vec<Op> {
        self.inner.borrow().ops.clone()
    }

    pub fn clear_ops(&self) {
        self.inner.borrow_mut().ops.clear();
    }

    pub fn violations(&self) -> Vec<String> {
        self.inner.borrow().violations.clone()
    }

    pub fn chains_created(&self) -> usize {
        self.inner.borrow().stopped.len()
    }

    pub fn count(&self, pred: impl Fn(&Op) -> bool) -> usize {
        self.inner.borrow().ops.iter().filter(|op| pred(op)).count()
    }

    pub fn starts(&self) -> usize {
        self.count(|op| matches!(op, Op::Start { .. }))
    }

    pub fn stops(&self) -> usize {
        self.count(|op| matches!(op, Op::Stop { .. }))
    }

    /// Last value written to `param` on `chain`, by target or ramp end.
    pub fn last_value(&self, chain: usize, param: VoiceParam) -> Option<f32> {
        self.inner.borrow().ops.iter().rev().find_map(|op| match *op {
            Op::Target {
                chain: c,
                param: p,
                value,
            } if c == chain && p == param => Some(value),
            Op::Ramp {
                chain: c,
                param: p,
                to,
                ..
            } if c == chain && p == param => Some(to),
            _ => None,
        })
    }
}

impl AudioGraph for RecordingGraph {
    type Chain = RecordingChain;

    fn create_chain(&self) -> Result<RecordingChain, AudioError> {
        let mut r = self.inner.borrow_mut();
        if r.fail_create {
            return Err(AudioError("context closed".into()));
        }
        let id = r.stopped.len();
        r.stopped.push(false);
        r.ops.push(Op::Create { chain: id });
        Ok(RecordingChain {
            id,
            inner: self.inner.clone(),
        })
    }

    fn now(&self) -> f64 {
        self.clock.get()
    }
}

pub struct RecordingChain {
    id: usize,
    inner: Rc<RefCell<Recorder>>,
}

impl RecordingChain {
    fn check_live(&self, what: &str) -> Result<(), AudioError> {
        let mut r = self.inner.borrow_mut();
        if r.stopped[self.id] {
            r.violations
                .push(format!("{what} on stopped chain {}", self.id));
            return Err(AudioError(format!("chain {} is stopped", self.id)));
        }
        Ok(())
    }
}

impl VoiceChain for RecordingChain {
    fn start(&self, when: f64) -> Result<(), AudioError> {
        self.check_live("start")?;
        self.inner
            .borrow_mut()
            .ops
            .push(Op::Start { chain: self.id, when });
        Ok(())
    }

    fn stop(&self) -> Result<(), AudioError> {
        self.check_live("stop")?;
        let mut r = self.inner.borrow_mut();
        r.stopped[self.id] = true;
        r.ops.push(Op::Stop { chain: self.id });
        Ok(())
    }

    fn set_target(
        &self,
        param: VoiceParam,
        value: f32,
        _at: f64,
        _time_constant: f64,
    ) -> Result<(), AudioError> {
        self.check_live("set_target")?;
        self.inner.borrow_mut().ops.push(Op::Target {
            chain: self.id,
            param,
            value,
        });
        Ok(())
    }

    fn ramp_linear(
        &self,
        param: VoiceParam,
        from: f32,
        to: f32,
        _at: f64,
        duration: f64,
    ) -> Result<(), AudioError> {
        self.check_live("ramp_linear")?;
        self.inner.borrow_mut().ops.push(Op::Ramp {
            chain: self.id,
            param,
            from,
            to,
            duration,
        });
        Ok(())
    }

    fn release(&self) {
        self.inner
            .borrow_mut()
            .ops
            .push(Op::Release { chain: self.id });
    }
}
