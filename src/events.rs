use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind,
};

use crate::app::{App, View};

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    // If the harvest form is open, it captures all input
    if app.harvest_form.is_some() {
        handle_form_input(app, key);
        return;
    }

    // If detail overlay is shown, handle overlay-specific keys
    if app.show_detail_overlay {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Backspace | KeyCode::Char('q') => {
                app.close_overlay();
            }
            // Allow scrolling through metrics while overlay is open
            KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
            KeyCode::Down | KeyCode::Char('j') => app.select_next(),
            KeyCode::Home => app.select_first(),
            KeyCode::End => app.select_last(),
            _ => {}
        }
        return;
    }

    // If filter input is active, handle text input
    if app.filter_active {
        handle_filter_input(app, key);
        return;
    }

    match key.code {
        // Quit
        KeyCode::Char('q') => app.quit(),

        // View switching
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.prev_view();
            } else {
                app.next_view();
            }
        }
        KeyCode::BackTab => app.prev_view(),

        // Direct view access
        KeyCode::Char('1') => app.set_view(View::Dashboard),
        KeyCode::Char('2') => app.set_view(View::Care),
        KeyCode::Char('3') => app.set_view(View::Harvest),

        // Navigation (up/down for items, left/right for tabs)
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Left | KeyCode::Char('h') => app.prev_view(),
        KeyCode::Right | KeyCode::Char('l') => app.next_view(),
        KeyCode::PageUp => app.select_prev_n(10),
        KeyCode::PageDown => app.select_next_n(10),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),

        // Enter detail overlay (Dashboard) or open the form (Harvest)
        KeyCode::Enter => match app.current_view {
            View::Dashboard => app.enter_detail(),
            View::Harvest => app.open_harvest_form(),
            View::Care => {}
        },

        // Go back (Esc and Backspace)
        KeyCode::Esc | KeyCode::Backspace => app.go_back(),

        // Reload
        KeyCode::Char('r') => {
            let _ = app.reload_data();
            app.reload_records();
        }

        // Help
        KeyCode::Char('?') => app.toggle_help(),

        // Actuator mode toggle
        KeyCode::Char('a') => app.toggle_auto_mode(),

        // New harvest entry / delete record (Harvest view)
        KeyCode::Char('n') => {
            if app.current_view == View::Harvest {
                app.open_harvest_form();
            }
        }
        KeyCode::Char('d') => {
            if app.current_view == View::Harvest {
                app.delete_selected_record();
            }
        }

        // Sorting (Dashboard view)
        KeyCode::Char('s') => app.cycle_sort(),
        KeyCode::Char('S') => app.toggle_sort_direction(),

        // Filter (Dashboard view)
        KeyCode::Char('/') => {
            if app.current_view == View::Dashboard {
                app.start_filter();
            }
        }
        KeyCode::Char('c') => app.clear_filter(),

        _ => {}
    }
}

/// Handle text input while the filter is active
fn handle_filter_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.cancel_filter(),
        KeyCode::Esc => app.clear_filter(),
        KeyCode::Backspace => app.filter_pop(),
        KeyCode::Char(c) => app.filter_push(c),
        _ => {}
    }
}

/// Handle text input while the harvest form is open
fn handle_form_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_harvest_form(),
        KeyCode::Enter => app.submit_harvest(),
        KeyCode::Tab | KeyCode::Down => {
            if let Some(form) = app.harvest_form.as_mut() {
                form.focused = form.focused.next();
            }
        }
        KeyCode::BackTab | KeyCode::Up => {
            if let Some(form) = app.harvest_form.as_mut() {
                form.focused = form.focused.prev();
            }
        }
        KeyCode::Backspace => {
            if let Some(form) = app.harvest_form.as_mut() {
                form.focused_text().pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(form) = app.harvest_form.as_mut() {
                form.focused_text().push(c);
            }
        }
        _ => {}
    }
}

/// Handle a mouse event (wheel scrolling over lists)
pub fn handle_mouse_event(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.select_prev(),
        MouseEventKind::ScrollDown => app.select_next(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::ChannelSource;
    use crate::store::{MemoryRecordStore, NoopControlSink, StaticIdentity};

    struct NoPhotos;
    impl crate::store::BlobStore for NoPhotos {
        fn store(&mut self, _source: &std::path::Path) -> anyhow::Result<String> {
            anyhow::bail!("no photo store in tests")
        }
    }

    fn test_app() -> App {
        let (_tx, source) = ChannelSource::create("test");
        App::new(
            Box::new(source),
            Box::new(MemoryRecordStore::new()),
            Box::new(StaticIdentity::new("tester")),
            Box::new(NoPhotos),
            Box::new(NoopControlSink),
        )
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::empty()));
    }

    #[test]
    fn test_quit_key() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.running);
    }

    #[test]
    fn test_tab_cycles_views() {
        let mut app = test_app();
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.current_view, View::Care);
        press(&mut app, KeyCode::BackTab);
        assert_eq!(app.current_view, View::Dashboard);
    }

    #[test]
    fn test_form_captures_input() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('3'));
        press(&mut app, KeyCode::Char('n'));
        assert!(app.harvest_form.is_some());

        // Move to quantity and type into it
        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Char('7'));
        assert_eq!(app.harvest_form.as_ref().unwrap().quantity, "7");

        // 'q' must type into the form, not quit
        press(&mut app, KeyCode::Char('q'));
        assert!(app.running);

        press(&mut app, KeyCode::Esc);
        assert!(app.harvest_form.is_none());
    }

    #[test]
    fn test_filter_input_mode() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('/'));
        assert!(app.filter_active);
        press(&mut app, KeyCode::Char('s'));
        press(&mut app, KeyCode::Char('o'));
        assert_eq!(app.filter_text, "so");
        press(&mut app, KeyCode::Enter);
        assert!(!app.filter_active);
        assert_eq!(app.filter_text, "so");
        press(&mut app, KeyCode::Char('c'));
        assert!(app.filter_text.is_empty());
    }

    #[test]
    fn test_help_closes_on_any_key() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);
        press(&mut app, KeyCode::Char('x'));
        assert!(!app.show_help);
    }
}
