use crate::texture::{LoadPhase, TextureSlot};

/// What the caller should do with a render request.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum RenderDecision {
    /// Draw immediately.
    RenderNow,
    /// Start the texture fetch; the request is remembered.
    FetchFirst,
    /// A fetch is in flight; the request was folded into the pending one.
    Coalesced,
}

/// Serializes render requests against a scene's texture fetch.
///
/// Requests arriving while the fetch is in flight collapse into a single
/// render that runs once the fetch succeeds. A failed fetch drops them.
///
/// The load phase is always read from the scene's [`TextureSlot`]; the
/// scheduler only remembers whether a render is owed.
#[derive(Debug, Clone)]
pub struct RenderScheduler {
    needs_texture: bool,
    pending: bool,
}

impl RenderScheduler {
    /// `needs_texture` is false for scenes that can draw immediately.
    pub fn new(needs_texture: bool) -> Self {
        Self {
            needs_texture,
            pending: false,
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending
    }

    pub fn request(&mut self, slot: &TextureSlot) -> RenderDecision {
        if !self.needs_texture {
            return RenderDecision::RenderNow;
        }

        match slot.phase() {
            LoadPhase::Ready => RenderDecision::RenderNow,
            LoadPhase::Idle => {
                self.pending = true;
                RenderDecision::FetchFirst
            }
            LoadPhase::FetchingTexture => {
                self.pending = true;
                RenderDecision::Coalesced
            }
        }
    }

    /// Called once the fetch started by [`RenderDecision::FetchFirst`] has
    /// settled. Returns `true` if one queued render must run now.
    pub fn fetch_finished(&mut self, slot: &TextureSlot) -> bool {
        let pending = std::mem::take(&mut self.pending);
        if slot.is_ready() {
            return pending;
        }
        if pending {
            log::debug!("texture fetch failed; dropping queued render");
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use image::RgbaImage;

    use crate::texture::{FetchErrorKind, TextureFetchError};

    fn offline(uri: &str) -> Result<RgbaImage, TextureFetchError> {
        Err(TextureFetchError::new(uri, FetchErrorKind::Io("offline".into())))
    }

    #[test]
    fn untextured_scene_always_renders_now() {
        let slot = TextureSlot::new();
        let mut s = RenderScheduler::new(false);
        assert_eq!(s.request(&slot), RenderDecision::RenderNow);
        assert_eq!(s.request(&slot), RenderDecision::RenderNow);
        assert!(!s.has_pending());
    }

    #[test]
    fn requests_during_fetch_coalesce_into_one_render() {
        let mut slot = TextureSlot::new();
        let mut s = RenderScheduler::new(true);
        assert_eq!(s.request(&slot), RenderDecision::FetchFirst);

        slot.begin_fetch("sky.png");
        assert_eq!(s.request(&slot), RenderDecision::Coalesced);
        assert_eq!(s.request(&slot), RenderDecision::Coalesced);

        slot.complete_fetch(Ok(RgbaImage::new(1, 1))).unwrap();
        assert!(s.fetch_finished(&slot));
        assert!(!s.has_pending());
        assert_eq!(s.request(&slot), RenderDecision::RenderNow);
    }

    #[test]
    fn failed_fetch_drops_queued_renders() {
        let mut slot = TextureSlot::new();
        let mut s = RenderScheduler::new(true);
        s.request(&slot);
        slot.begin_fetch("sky.png");
        s.request(&slot);

        slot.complete_fetch(offline("sky.png")).unwrap_err();
        assert!(!s.fetch_finished(&slot));
        assert!(!s.has_pending());

        // The next request retries the fetch.
        assert_eq!(s.request(&slot), RenderDecision::FetchFirst);
    }

    #[test]
    fn decision_follows_slot_without_notification() {
        // The slot reaches Ready on its own; the scheduler never hears about
        // it and still renders straight away.
        let mut slot = TextureSlot::new();
        let mut s = RenderScheduler::new(true);
        slot.begin_fetch("sky.png");
        slot.complete_fetch(Ok(RgbaImage::new(1, 1))).unwrap();
        assert_eq!(s.request(&slot), RenderDecision::RenderNow);

        // And falls back to fetching once the slot has failed again.
        slot.begin_fetch("gone.png");
        slot.complete_fetch(offline("gone.png")).unwrap_err();
        assert_eq!(s.request(&slot), RenderDecision::FetchFirst);
    }
}
