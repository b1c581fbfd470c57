use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

const PAGE_ROWS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    InputChar(char),
    Backspace,
    ClearQuery,
    Up(usize),
    Down(usize),
    Top,
    Bottom,
    Confirm,
    Cancel,
}

pub fn map_key(key: KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return map_ctrl_key(key.code);
    }

    match key.code {
        KeyCode::Esc => Some(Action::Cancel),
        KeyCode::Enter => Some(Action::Confirm),
        KeyCode::Backspace => Some(Action::Backspace),
        KeyCode::Up => Some(Action::Up(1)),
        KeyCode::Down => Some(Action::Down(1)),
        KeyCode::BackTab => Some(Action::Up(1)),
        KeyCode::Tab => Some(Action::Down(1)),
        KeyCode::PageUp => Some(Action::Up(PAGE_ROWS)),
        KeyCode::PageDown => Some(Action::Down(PAGE_ROWS)),
        KeyCode::Home => Some(Action::Top),
        KeyCode::End => Some(Action::Bottom),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::ALT) => {
            Some(Action::InputChar(c))
        }
        _ => None,
    }
}

fn map_ctrl_key(code: KeyCode) -> Option<Action> {
    match code {
        KeyCode::Char('c') | KeyCode::Char('g') | KeyCode::Char('d') => Some(Action::Cancel),
        KeyCode::Char('p') | KeyCode::Char('k') => Some(Action::Up(1)),
        KeyCode::Char('n') | KeyCode::Char('j') => Some(Action::Down(1)),
        KeyCode::Char('u') => Some(Action::ClearQuery),
        KeyCode::Char('m') => Some(Action::Confirm),
        KeyCode::Char('h') | KeyCode::Backspace => Some(Action::Backspace),
        KeyCode::Esc => Some(Action::Cancel),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{Action, map_key};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    #[test]
    fn printable_chars_feed_the_query() {
        let key = KeyEvent::new(KeyCode::Char('a'), KeyModifiers::NONE);
        assert_eq!(map_key(key), Some(Action::InputChar('a')));
    }

    #[test]
    fn shifted_chars_keep_their_case() {
        let key = KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT);
        assert_eq!(map_key(key), Some(Action::InputChar('A')));
    }

    #[test]
    fn esc_and_ctrl_c_cancel() {
        let esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(map_key(esc), Some(Action::Cancel));
        assert_eq!(map_key(ctrl_c), Some(Action::Cancel));
    }

    #[test]
    fn ctrl_n_and_ctrl_p_move_cursor() {
        let ctrl_n = KeyEvent::new(KeyCode::Char('n'), KeyModifiers::CONTROL);
        let ctrl_p = KeyEvent::new(KeyCode::Char('p'), KeyModifiers::CONTROL);
        assert_eq!(map_key(ctrl_n), Some(Action::Down(1)));
        assert_eq!(map_key(ctrl_p), Some(Action::Up(1)));
    }

    #[test]
    fn page_keys_move_by_page() {
        let page_down = KeyEvent::new(KeyCode::PageDown, KeyModifiers::NONE);
        assert_eq!(map_key(page_down), Some(Action::Down(10)));
    }

    #[test]
    fn unbound_ctrl_chars_are_ignored() {
        let ctrl_x = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::CONTROL);
        assert_eq!(map_key(ctrl_x), None);
    }

    #[test]
    fn enter_confirms() {
        let key = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(map_key(key), Some(Action::Confirm));
    }
}
