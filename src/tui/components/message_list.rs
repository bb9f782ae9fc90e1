//! # MessageList Component
//!
//! Scrollable view of the message thread.
//!
//! `MessageList` is a transient component (created each frame) that wraps
//! `&'a mut MessageListState` (persistent state) and the thread's messages
//! (props). Heights are measured every frame, which keeps the layout exact
//! while placeholders resolve in place.

use ratatui::Frame;
use ratatui::layout::{Position, Rect, Size};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::message::Message;
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::message::MessageBubble;
use crate::tui::event::TuiEvent;

/// Scroll and selection state for the message list.
/// Persisted in the parent `TuiState`.
pub struct MessageListState {
    pub scroll_state: ScrollViewState,
    /// Height of each message at the last rendered width
    pub heights: Vec<u16>,
    /// Running totals of `heights` (bottom edge of each message)
    pub prefix_heights: Vec<u16>,
    /// When true, auto-scroll to bottom on new content
    pub stick_to_bottom: bool,
    /// Message selected in message-selection mode
    pub selected_index: Option<usize>,
    /// Last known viewport height
    pub viewport_height: u16,
}

impl Default for MessageListState {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageListState {
    pub fn new() -> Self {
        Self {
            scroll_state: ScrollViewState::default(),
            heights: Vec::new(),
            prefix_heights: Vec::new(),
            stick_to_bottom: true,
            selected_index: None,
            viewport_height: 0,
        }
    }

    fn total_height(&self) -> u16 {
        self.prefix_heights.last().copied().unwrap_or(0)
    }

    /// Recompute heights for `messages` at `width`.
    pub fn measure(&mut self, messages: &[Message], width: u16) {
        self.heights = messages
            .iter()
            .map(|m| MessageBubble::calculate_height(m, width))
            .collect();
        self.prefix_heights = self
            .heights
            .iter()
            .scan(0u16, |acc, &h| {
                *acc = acc.saturating_add(h);
                Some(*acc)
            })
            .collect();
    }

    /// Clamp scroll offset so it never exceeds the content bounds.
    pub fn clamp_scroll(&mut self) {
        let max_y = self.total_height().saturating_sub(self.viewport_height);
        let current = self.scroll_state.offset();
        if current.y > max_y {
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Scroll so the selected message is fully visible.
    /// Messages taller than the viewport align to their top edge.
    pub fn scroll_to_selected(&mut self) {
        let Some(idx) = self.selected_index else {
            return;
        };
        if idx >= self.prefix_heights.len() {
            return;
        }

        let item_top = if idx == 0 {
            0
        } else {
            self.prefix_heights[idx - 1]
        };
        let item_bottom = self.prefix_heights[idx];
        let offset_y = self.scroll_state.offset().y;

        if item_top < offset_y {
            self.scroll_state.set_offset(Position { x: 0, y: item_top });
            self.stick_to_bottom = false;
        } else if item_bottom > offset_y + self.viewport_height {
            let new_y = item_bottom.saturating_sub(self.viewport_height);
            self.scroll_state.set_offset(Position { x: 0, y: new_y });
            let max_y = self.total_height().saturating_sub(self.viewport_height);
            self.stick_to_bottom = new_y >= max_y;
        }
    }

    /// Re-engage auto-scroll once the user scrolls back to the bottom.
    pub fn repin_if_at_bottom(&mut self) {
        let max_y = self.total_height().saturating_sub(self.viewport_height);
        let current = self.scroll_state.offset();
        if current.y >= max_y {
            self.stick_to_bottom = true;
            self.scroll_state.set_offset(Position {
                x: current.x,
                y: max_y,
            });
        }
    }

    /// Move the selection one message up; starts from the last message.
    pub fn select_previous(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let idx = self
            .selected_index
            .map(|i| i.saturating_sub(1))
            .unwrap_or(len - 1);
        self.selected_index = Some(idx.min(len - 1));
        self.scroll_to_selected();
    }

    pub fn select_next(&mut self, len: usize) {
        if let Some(idx) = self.selected_index
            && idx + 1 < len
        {
            self.selected_index = Some(idx + 1);
            self.scroll_to_selected();
        }
    }

    /// Message index under row `content_y` of the scroll canvas.
    pub fn index_at(&self, content_y: u16) -> Option<usize> {
        let idx = self.prefix_heights.partition_point(|&end| end <= content_y);
        (idx < self.prefix_heights.len()).then_some(idx)
    }

    /// Message index under a screen row, given the list's on-screen area.
    pub fn hit_test(&self, screen_y: u16, area: Rect) -> Option<usize> {
        if screen_y < area.y || screen_y >= area.y + area.height {
            return None;
        }
        let content_y = (screen_y - area.y).saturating_add(self.scroll_state.offset().y);
        self.index_at(content_y)
    }

    /// Range of message indices intersecting the viewport, with half a
    /// screen of buffer on either side.
    pub fn visible_range(&self, scroll_offset: u16, viewport_height: u16) -> std::ops::Range<usize> {
        let buffer = viewport_height / 2;
        let buffered_start = scroll_offset.saturating_sub(buffer);
        let buffered_end = scroll_offset
            .saturating_add(viewport_height)
            .saturating_add(buffer);

        let start = self
            .prefix_heights
            .partition_point(|&end| end <= buffered_start);
        let end = self
            .prefix_heights
            .partition_point(|&end| end < buffered_end)
            .saturating_add(1)
            .min(self.prefix_heights.len());

        start..end
    }
}

/// Scrollable thread view. Created fresh each frame.
pub struct MessageList<'a> {
    pub state: &'a mut MessageListState,
    pub messages: &'a [Message],
    pub typing_frame: usize,
}

impl<'a> MessageList<'a> {
    pub fn new(state: &'a mut MessageListState, messages: &'a [Message], typing_frame: usize) -> Self {
        Self {
            state,
            messages,
            typing_frame,
        }
    }
}

impl Component for MessageList<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let content_width = area.width.saturating_sub(1); // -1 for scrollbar
        self.state.measure(self.messages, content_width);
        let total_height = self.state.total_height();

        self.state.viewport_height = area.height;
        if !self.state.stick_to_bottom {
            self.state.clamp_scroll();
        }

        let scroll_offset = self.state.scroll_state.offset().y;
        let visible = self.state.visible_range(scroll_offset, area.height);

        let mut scroll_view = ScrollView::new(Size::new(content_width, total_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Always)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);

        let mut y_offset: u16 = if visible.start > 0 {
            self.state.prefix_heights[visible.start - 1]
        } else {
            0
        };

        for i in visible {
            let height = self.state.heights[i];
            let rect = Rect::new(0, y_offset, content_width, height);
            let is_selected = self.state.selected_index == Some(i);
            scroll_view.render_widget(
                MessageBubble::new(&self.messages[i], is_selected, self.typing_frame),
                rect,
            );
            y_offset = y_offset.saturating_add(height);
        }

        if self.state.stick_to_bottom {
            self.state.scroll_state.scroll_to_bottom();
        }

        frame.render_stateful_widget(scroll_view, area, &mut self.state.scroll_state);
    }
}

impl EventHandler for MessageListState {
    type Event = ();

    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event> {
        match event {
            TuiEvent::ScrollUp => {
                self.scroll_state.scroll_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollDown => {
                self.scroll_state.scroll_down();
                self.repin_if_at_bottom();
            }
            TuiEvent::ScrollPageUp => {
                self.scroll_state.scroll_page_up();
                self.stick_to_bottom = false;
            }
            TuiEvent::ScrollPageDown => {
                self.scroll_state.scroll_page_down();
                self.repin_if_at_bottom();
            }
            _ => {}
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::thread::Thread;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn state_with_heights(heights: &[u16]) -> MessageListState {
        let mut state = MessageListState::new();
        state.heights = heights.to_vec();
        state.prefix_heights = heights
            .iter()
            .scan(0u16, |acc, &h| {
                *acc += h;
                Some(*acc)
            })
            .collect();
        state
    }

    #[test]
    fn index_at_walks_prefix_heights() {
        let state = state_with_heights(&[3, 4, 2]);
        assert_eq!(state.index_at(0), Some(0));
        assert_eq!(state.index_at(2), Some(0));
        assert_eq!(state.index_at(3), Some(1));
        assert_eq!(state.index_at(8), Some(2));
        assert_eq!(state.index_at(9), None);
    }

    #[test]
    fn hit_test_respects_area() {
        let state = state_with_heights(&[3, 3]);
        let area = Rect::new(0, 2, 40, 10);
        assert_eq!(state.hit_test(1, area), None);
        assert_eq!(state.hit_test(2, area), Some(0));
        assert_eq!(state.hit_test(5, area), Some(1));
        assert_eq!(state.hit_test(12, area), None);
    }

    #[test]
    fn selection_starts_at_last_and_moves() {
        let mut state = state_with_heights(&[3, 3, 3]);
        state.viewport_height = 20;
        state.select_previous(3);
        assert_eq!(state.selected_index, Some(2));
        state.select_previous(3);
        assert_eq!(state.selected_index, Some(1));
        state.select_next(3);
        state.select_next(3);
        assert_eq!(state.selected_index, Some(2));
    }

    #[test]
    fn selecting_above_viewport_unpins() {
        let mut state = state_with_heights(&[10, 10, 10]);
        state.viewport_height = 10;
        state.scroll_state.set_offset(Position { x: 0, y: 20 });
        state.selected_index = Some(0);
        state.scroll_to_selected();
        assert_eq!(state.scroll_state.offset().y, 0);
        assert!(!state.stick_to_bottom);
    }

    #[test]
    fn scroll_up_unpins_and_bottom_repins() {
        let mut state = state_with_heights(&[10, 10]);
        state.viewport_height = 5;
        state.handle_event(&TuiEvent::ScrollUp);
        assert!(!state.stick_to_bottom);
        state.scroll_state.set_offset(Position { x: 0, y: 15 });
        state.repin_if_at_bottom();
        assert!(state.stick_to_bottom);
    }

    #[test]
    fn visible_range_covers_viewport() {
        let state = state_with_heights(&[5; 20]);
        let range = state.visible_range(50, 10);
        assert!(range.start <= 10 && range.end >= 12);
        assert!(range.end <= 20);
    }

    #[test]
    fn renders_thread() {
        let backend = TestBackend::new(50, 20);
        let mut terminal = Terminal::new(backend).unwrap();
        let mut thread = Thread::with_greeting("Hello there");
        thread.push_user("find my pdf".into());
        thread.push_placeholder();
        let mut state = MessageListState::new();

        terminal
            .draw(|f| {
                MessageList::new(&mut state, thread.messages(), 0).render(f, f.area());
            })
            .unwrap();

        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Hello there"));
        assert!(text.contains("find my pdf"));
        assert_eq!(state.heights.len(), 3);
    }
}
