use serde::{Deserialize, Serialize};

use crate::scene::SceneKind;

/// Position of a background clip in the flat B-roll list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClipSlot {
    Intro,
    Module(usize),
    Summary,
}

impl ClipSlot {
    /// Every slot for a storyboard with `module_count` modules, in list order.
    pub fn all(module_count: usize) -> Vec<ClipSlot> {
        let mut slots = Vec::with_capacity(module_count + 2);
        slots.push(ClipSlot::Intro);
        slots.extend((0..module_count).map(ClipSlot::Module));
        slots.push(ClipSlot::Summary);
        slots
    }
}

/// Ordered background clip references:
/// `[intro, module-0, ..., module-N, summary]`.
///
/// Entries may be null when a clip failed to generate so later positions
/// keep their meaning. Lookups never fail; a missing clip is no background.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct BackgroundClips(Vec<Option<String>>);

impl BackgroundClips {
    pub fn new(clips: Vec<Option<String>>) -> Self {
        Self(clips)
    }

    pub fn from_refs<I, S>(refs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(refs.into_iter().map(|r| Some(r.into())).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn at(&self, index: usize) -> Option<&str> {
        self.0.get(index).and_then(|c| c.as_deref())
    }

    /// Clip for a slot. The summary always reads the last entry.
    pub fn get(&self, slot: ClipSlot) -> Option<&str> {
        match slot {
            ClipSlot::Intro => self.at(0),
            ClipSlot::Module(i) => self.at(i + 1),
            ClipSlot::Summary => self.0.len().checked_sub(1).and_then(|last| self.at(last)),
        }
    }

    /// Clip for a planned scene. Overview scenes have no slot of their own.
    pub fn for_scene(&self, kind: &SceneKind) -> Option<&str> {
        match *kind {
            SceneKind::Intro => self.get(ClipSlot::Intro),
            SceneKind::Module(i) => self.get(ClipSlot::Module(i)),
            SceneKind::Summary => self.get(ClipSlot::Summary),
            SceneKind::Overview(_) => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<&str>> {
        self.0.iter().map(|c| c.as_deref())
    }
}

impl From<Vec<Option<String>>> for BackgroundClips {
    fn from(clips: Vec<Option<String>>) -> Self {
        Self(clips)
    }
}
