use std::ops::Range;

use tracing::debug;

pub const PAGE_SIZE: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderPhase {
    #[default]
    Idle,
    Rendering,
}

/// What the "load more" affordance below the grid should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMore {
    Hidden,
    Visible { remaining: usize },
}

/// A page handed out by [`Paginator::begin_page`]. Only the ticket of the current list
/// generation can advance the rendered count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTicket {
    generation: u64,
    range: Range<usize>,
}

impl PageTicket {
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }
}

/// Incremental rendering over a filtered, sorted list of `total` entries.
#[derive(Debug, Clone, Default)]
pub struct Paginator {
    total: usize,
    rendered: usize,
    phase: RenderPhase,
    generation: u64,
}

impl Paginator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts over for a freshly computed list. Outstanding tickets become stale.
    pub fn reset(&mut self, total: usize) {
        self.total = total;
        self.rendered = 0;
        self.phase = RenderPhase::Idle;
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn begin_page(&mut self) -> Option<PageTicket> {
        if self.phase == RenderPhase::Rendering || self.is_complete() {
            return None;
        }

        self.phase = RenderPhase::Rendering;
        let end = (self.rendered + PAGE_SIZE).min(self.total);
        Some(PageTicket { generation: self.generation, range: self.rendered..end })
    }

    pub fn finish_page(&mut self, ticket: PageTicket) -> LoadMore {
        if ticket.generation != self.generation {
            debug!(stale = ticket.generation, current = self.generation, "Ignoring stale page");
            return self.load_more();
        }

        self.rendered = ticket.range.end;
        self.phase = RenderPhase::Idle;
        debug!(rendered = self.rendered, total = self.total, "Page rendered");
        self.load_more()
    }

    /// Next slice to append, or `None` while a page is in flight or once everything is
    /// rendered.
    pub fn render_more(&mut self) -> Option<Range<usize>> {
        let ticket = self.begin_page()?;
        let range = ticket.range();
        self.finish_page(ticket);
        Some(range)
    }

    /// Scroll trigger. Shares the re-entrancy guard of [`Paginator::render_more`].
    pub fn on_viewport(&mut self, sentinel_visible: bool) -> Option<Range<usize>> {
        if !sentinel_visible {
            return None;
        }
        self.render_more()
    }

    pub fn load_more(&self) -> LoadMore {
        match self.remaining() {
            0 => LoadMore::Hidden,
            remaining => LoadMore::Visible { remaining },
        }
    }

    pub fn rendered(&self) -> usize {
        self.rendered
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.rendered)
    }

    pub fn phase(&self) -> RenderPhase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.rendered >= self.total
    }
}
