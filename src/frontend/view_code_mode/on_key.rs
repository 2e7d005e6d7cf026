use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::{frontend::App, session::SessionAction};

/// `Ctrl-Enter` (or `Super-Enter`) submits the request, adding `Shift` executes instead
#[must_use]
pub fn confirm_action(key: &KeyEvent) -> Option<SessionAction> {
    let primary = key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::SUPER);

    if key.code != KeyCode::Enter || !primary {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::SHIFT) {
        Some(SessionAction::Execute)
    } else {
        Some(SessionAction::SubmitEdit)
    }
}

pub fn on_key(app: &mut App, key: KeyEvent) {
    if let Some(action) = confirm_action(&key) {
        return app.session_action(action);
    }

    // `Ctrl-r` reloads the file from the branch
    if key.code == KeyCode::Char('r') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return app.session_action(SessionAction::Refetch);
    }

    match key.code {
        KeyCode::Tab => app.session_action(SessionAction::ToggleView),
        KeyCode::Esc if app.notification.is_some() => {
            app.dismiss_notification();
            app.session_action(SessionAction::DismissError);
        }
        KeyCode::Esc => app.close_session_view(),
        KeyCode::PageUp => app.code_scroll = app.code_scroll.saturating_sub(10),
        KeyCode::PageDown => app.code_scroll = app.code_scroll.saturating_add(10),
        // Typing stays possible while a call is in flight, only confirming is phase guarded
        _ => {
            if app.session.is_some() && app.text_input.input(key) {
                let request = app.text_input.lines().join("\n");
                app.session_action(SessionAction::SetRequestText(request));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirm_action() {
        let cases = [
            (KeyModifiers::CONTROL, Some(SessionAction::SubmitEdit)),
            (KeyModifiers::SUPER, Some(SessionAction::SubmitEdit)),
            (
                KeyModifiers::CONTROL | KeyModifiers::SHIFT,
                Some(SessionAction::Execute),
            ),
            (
                KeyModifiers::SUPER | KeyModifiers::SHIFT,
                Some(SessionAction::Execute),
            ),
            (KeyModifiers::SHIFT, None),
            (KeyModifiers::NONE, None),
        ];

        for (modifiers, expected) in cases {
            let key = KeyEvent::new(KeyCode::Enter, modifiers);
            assert_eq!(confirm_action(&key), expected, "for {modifiers:?}");
        }
    }

    #[test]
    fn test_other_keys_do_not_confirm() {
        let key = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);

        assert_eq!(confirm_action(&key), None);
    }
}
