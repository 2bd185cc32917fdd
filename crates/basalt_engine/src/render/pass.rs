//! Subpass schedules and their build-time validation
//!
//! A pipeline declares its subpasses up front: which attachments each one
//! reads and which it writes, and whether a write replaces the attachment
//! or accumulates into it. The schedule is validated once when the
//! pipeline is built, so frame execution never has to re-check attachment
//! hazards.
//!
//! The rules mirror a render graph's dependency checks: a read must be
//! satisfied by a write in an earlier subpass (never the same one), and an
//! attachment may have at most one replacing writer per frame. Any number
//! of accumulating writers may stack on one attachment, which is how the
//! lighting subpasses sum into the color target.

use std::collections::{HashMap, HashSet};

use crate::render::attachments::{Attachment, AttachmentAccess};
use crate::render::PipelineError;

/// How a subpass writes an attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOp {
    /// The subpass is the attachment's sole producer this frame
    Replace,
    /// The subpass adds its contribution to whatever is already stored
    Accumulate,
}

/// One subpass's declared attachment accesses
#[derive(Debug, Clone)]
pub struct SubpassDesc {
    name: &'static str,
    reads: Vec<Attachment>,
    writes: Vec<(Attachment, WriteOp)>,
}

impl SubpassDesc {
    /// Start describing a subpass
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            reads: Vec::new(),
            writes: Vec::new(),
        }
    }

    /// Declare that the subpass samples an attachment
    #[must_use]
    pub fn read(mut self, attachment: Attachment) -> Self {
        self.reads.push(attachment);
        self
    }

    /// Declare that the subpass stores to an attachment
    #[must_use]
    pub fn write(mut self, attachment: Attachment, op: WriteOp) -> Self {
        self.writes.push((attachment, op));
        self
    }

    /// The subpass name
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Attachments the subpass reads
    pub fn reads(&self) -> &[Attachment] {
        &self.reads
    }

    /// Attachments the subpass writes, with their write semantics
    pub fn writes(&self) -> &[(Attachment, WriteOp)] {
        &self.writes
    }
}

/// A validated, ordered list of subpasses
#[derive(Debug, Clone)]
pub struct PassSchedule {
    subpasses: Vec<SubpassDesc>,
}

impl PassSchedule {
    /// Validate a subpass list into a schedule
    ///
    /// # Errors
    /// * [`PipelineError::ReadWriteSameSubpass`] if a subpass declares both
    ///   accesses on one attachment.
    /// * [`PipelineError::ReadBeforeWrite`] if a read has no writer in any
    ///   earlier subpass.
    /// * [`PipelineError::WriteConflict`] if two subpasses replace-write
    ///   the same attachment.
    pub fn new(subpasses: Vec<SubpassDesc>) -> Result<Self, PipelineError> {
        let mut written: HashSet<Attachment> = HashSet::new();
        let mut replaced_by: HashMap<Attachment, &'static str> = HashMap::new();

        for subpass in &subpasses {
            let mut access: HashMap<Attachment, AttachmentAccess> = HashMap::new();
            for &attachment in subpass.reads() {
                *access
                    .entry(attachment)
                    .or_insert(AttachmentAccess::empty()) |= AttachmentAccess::READ;
            }
            for &(attachment, _) in subpass.writes() {
                *access
                    .entry(attachment)
                    .or_insert(AttachmentAccess::empty()) |= AttachmentAccess::WRITE;
            }

            for (&attachment, &flags) in &access {
                if flags.contains(AttachmentAccess::READ | AttachmentAccess::WRITE) {
                    return Err(PipelineError::ReadWriteSameSubpass {
                        subpass: subpass.name(),
                        attachment,
                    });
                }
            }

            // Reads are only satisfied by writes from earlier subpasses.
            for &attachment in subpass.reads() {
                if !written.contains(&attachment) {
                    return Err(PipelineError::ReadBeforeWrite {
                        subpass: subpass.name(),
                        attachment,
                    });
                }
            }

            for &(attachment, op) in subpass.writes() {
                if op == WriteOp::Replace {
                    if let Some(&first) = replaced_by.get(&attachment) {
                        return Err(PipelineError::WriteConflict {
                            attachment,
                            first,
                            second: subpass.name(),
                        });
                    }
                    replaced_by.insert(attachment, subpass.name());
                }
                written.insert(attachment);
            }
        }

        log::debug!("validated pass schedule with {} subpasses", subpasses.len());
        Ok(Self { subpasses })
    }

    /// The subpasses in execution order
    pub fn subpasses(&self) -> &[SubpassDesc] {
        &self.subpasses
    }
}

/// The deferred pipeline's schedule
///
/// Geometry produces the attribute attachments, then the point-light and
/// ambient subpasses accumulate into the color target. Unlit geometry
/// belongs to the geometry subpass since it shares the depth plane.
pub fn deferred_schedule() -> Result<PassSchedule, PipelineError> {
    PassSchedule::new(vec![
        SubpassDesc::new("geometry")
            .write(Attachment::Albedo, WriteOp::Replace)
            .write(Attachment::Normal, WriteOp::Replace)
            .write(Attachment::Position, WriteOp::Replace)
            .write(Attachment::Specular, WriteOp::Replace)
            .write(Attachment::Depth, WriteOp::Replace)
            .write(Attachment::Color, WriteOp::Replace),
        SubpassDesc::new("point_lighting")
            .read(Attachment::Albedo)
            .read(Attachment::Normal)
            .read(Attachment::Position)
            .read(Attachment::Specular)
            .read(Attachment::Depth)
            .write(Attachment::Color, WriteOp::Accumulate),
        SubpassDesc::new("ambient")
            .read(Attachment::Albedo)
            .read(Attachment::Depth)
            .write(Attachment::Color, WriteOp::Accumulate),
    ])
}

/// The ray-marched pipeline's schedule: one full-screen subpass
pub fn marched_schedule() -> Result<PassSchedule, PipelineError> {
    PassSchedule::new(vec![
        SubpassDesc::new("march").write(Attachment::Color, WriteOp::Replace)
    ])
}
