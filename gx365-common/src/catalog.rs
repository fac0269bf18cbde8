use crate::mapping::TrackMapping;
use crate::play_order::PlayOrder;
use crate::track_id::TrackId;

/// One slot of the year-long track list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogTrack {
    pub id: TrackId,
    /// Audio URL, present only when the slot is in the mapping.
    pub url: Option<String>,
}

impl CatalogTrack {
    pub fn label(&self) -> String {
        self.id.label()
    }

    pub fn is_available(&self) -> bool {
        self.url.is_some()
    }
}

/// What to do when the current track ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextTrack {
    Play(TrackId),
    /// Nothing playable after the current track.
    Stop,
}

/// Player-side view of the release: all 365 slots, which ones are
/// playable, and the order they are listed and played in.
///
/// Pure data structure, no I/O. Built from the published mapping; the
/// server still re-checks every audio request on its own.
pub struct TrackCatalog {
    /// Indexed by `id - 1`.
    tracks: Vec<CatalogTrack>,
    display: Vec<TrackId>,
    play_order: PlayOrder,
    current: Option<TrackId>,
}

impl TrackCatalog {
    /// Build the catalog, pointing playable slots at `{audio_base}/{key}`.
    /// The first playable slot becomes current.
    pub fn from_mapping(mapping: &TrackMapping, audio_base: &str) -> Self {
        let base = audio_base.trim_end_matches('/');
        let tracks: Vec<CatalogTrack> = TrackId::all()
            .map(|id| CatalogTrack {
                id,
                url: mapping.get(id).map(|key| format!("{base}/{key}")),
            })
            .collect();

        let mut catalog = Self {
            tracks,
            display: TrackId::all().collect(),
            play_order: PlayOrder::default(),
            current: None,
        };
        catalog.current = catalog.first_available();
        catalog
    }

    pub fn track(&self, id: TrackId) -> &CatalogTrack {
        &self.tracks[usize::from(id.get() - 1)]
    }

    pub fn tracks(&self) -> &[CatalogTrack] {
        &self.tracks
    }

    pub fn available_count(&self) -> usize {
        self.tracks.iter().filter(|t| t.is_available()).count()
    }

    /// Slots in the order they are listed.
    pub fn display_order(&self) -> &[TrackId] {
        &self.display
    }

    pub fn first_available(&self) -> Option<TrackId> {
        self.tracks.iter().find(|t| t.is_available()).map(|t| t.id)
    }

    pub fn current(&self) -> Option<TrackId> {
        self.current
    }

    pub fn play_order(&self) -> PlayOrder {
        self.play_order
    }

    /// Flip the play order. Switching to sequential restores the listing
    /// to track-number order.
    pub fn toggle_play_order(&mut self) -> PlayOrder {
        self.play_order = self.play_order.toggled();
        if self.play_order == PlayOrder::Sequential {
            self.display.sort();
        }
        self.play_order
    }

    /// Make `id` current. Returns false, changing nothing, if the slot
    /// is not playable. In dynamic order the slot moves to the top.
    pub fn select(&mut self, id: TrackId) -> bool {
        if !self.track(id).is_available() {
            return false;
        }

        self.current = Some(id);
        if self.play_order == PlayOrder::Dynamic {
            if let Some(pos) = self.display.iter().position(|&d| d == id) {
                let moved = self.display.remove(pos);
                self.display.insert(0, moved);
            }
        }
        true
    }

    /// Advance past the current track and select whatever comes next.
    pub fn next_track(&mut self) -> NextTrack {
        let Some(current) = self.current else {
            return NextTrack::Stop;
        };

        let next = match self.play_order {
            PlayOrder::Sequential => TrackId::all()
                .skip_while(|&id| id <= current)
                .find(|&id| self.track(id).is_available()),
            PlayOrder::Dynamic => self
                .display
                .iter()
                .skip_while(|&&id| id != current)
                .skip(1)
                .copied()
                .find(|&id| self.track(id).is_available()),
        };

        match next {
            Some(id) => {
                self.select(id);
                NextTrack::Play(id)
            }
            None => NextTrack::Stop,
        }
    }
}
