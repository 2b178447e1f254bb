use std::collections::HashMap;

use crate::lexer::Location;
use crate::runtime::Value;

/// Handle to one frame in the environment arena
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameId(usize);

/// Single call frame: a scope table plus the links diagnostics walk
#[derive(Debug, Clone)]
struct Frame {
    /// Frame name shown in trace output
    name: String,
    /// Lexical parent (None for the root frame)
    parent: Option<FrameId>,
    /// Location the frame was entered from, if it models a call
    call_site: Option<Location>,
    /// Variables bound in this frame
    vars: HashMap<String, Value>,
}

/// Environment for variable scoping and call frames
///
/// Frames live in an arena addressed by stable ids, so a closure can
/// keep the id of its defining frame and outlive the call that created
/// it. Parent links are acyclic by construction: a child frame can only
/// point at a frame that already exists.
#[derive(Debug, Clone)]
pub struct Environment {
    frames: Vec<Frame>,
}

impl Environment {
    /// Creates an environment holding a single root frame
    pub fn new(root_name: impl Into<String>) -> Self {
        Environment {
            frames: vec![Frame {
                name: root_name.into(),
                parent: None,
                call_site: None,
                vars: HashMap::new(),
            }],
        }
    }

    /// Id of the root frame
    pub fn root(&self) -> FrameId {
        FrameId(0)
    }

    /// Allocates a child frame for a call
    pub fn push_frame(
        &mut self,
        name: impl Into<String>,
        parent: FrameId,
        call_site: Option<Location>,
    ) -> FrameId {
        let id = FrameId(self.frames.len());
        self.frames.push(Frame {
            name: name.into(),
            parent: Some(parent),
            call_site,
            vars: HashMap::new(),
        });
        id
    }

    /// Binds a name in the given frame, overwriting any previous binding
    pub fn define(&mut self, frame: FrameId, name: impl Into<String>, value: Value) {
        self.frames[frame.0].vars.insert(name.into(), value);
    }

    /// Looks a name up through the frame chain, innermost first
    pub fn lookup(&self, frame: FrameId, name: &str) -> Option<&Value> {
        let mut cur = Some(frame);
        while let Some(id) = cur {
            let f = &self.frames[id.0];
            if let Some(value) = f.vars.get(name) {
                return Some(value);
            }
            cur = f.parent;
        }
        None
    }

    /// Name of the given frame, as shown in trace output
    pub fn frame_name(&self, frame: FrameId) -> &str {
        &self.frames[frame.0].name
    }

    /// Renders the diagnostic trace for an error raised in `frame`
    ///
    /// One line per enclosing frame, innermost first: the error's own
    /// location first, then each ancestor's call site, each suffixed
    /// with `->`. A frame with no location at that point contributes no
    /// line.
    pub fn backtrace(&self, loc: Option<&Location>, frame: Option<FrameId>) -> Vec<String> {
        let mut lines = Vec::new();
        let mut location = loc.cloned();
        let mut cur = frame;
        while let Some(id) = cur {
            let f = &self.frames[id.0];
            if let Some(at) = &location {
                lines.push(format!("{} ->", at));
            }
            location = f.call_site.clone();
            cur = f.parent;
        }
        lines
    }
}
