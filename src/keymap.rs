use sdl2::{event::Event, keyboard::Keycode};

use crate::input::Key;

/// Makes dealing with SDL keymapping less verbose
macro_rules! map_keys {
    // entry point
    ($event:expr, $($input:tt)*) => {
        map_keys!(@inner $event, parsed=[], rest=[ $($input)* ])
    };

    // stop condition
    (@inner $event:expr, parsed = [$($parsed:tt)*], rest = [ ]) => {
        match $event {
            $($parsed)*
            _ => None
        }
    };

    // normal keydown
    (   @inner
        $event:expr,
        parsed = [$($parsed:tt)*],
        rest = [
            $keycode:pat => $action:expr,
            $($rest:tt)*
        ]
    ) => {
        map_keys!(
            @inner
            $event,
            parsed = [
                $($parsed)*
                Event::KeyDown {keycode: Some($keycode), repeat: false, .. } => Some($action),
            ],
            rest = [
                $($rest)*
            ]
        )
    };

    // keypad key, both down and up
    (
        @inner
        $event:expr,
        parsed = [$($parsed:tt)*],
        rest = [
            @keypad $keycode:pat => $key:expr,
            $($rest:tt)*
        ]
    ) => {
        map_keys!(
            @inner
            $event,
            parsed = [
                $($parsed)*
                Event::KeyDown {keycode: Some($keycode), repeat: false, .. } => Some(Action::KeyDown(Key::from_nibble($key))),
                Event::KeyUp {keycode: Some($keycode), .. } => Some(Action::KeyUp(Key::from_nibble($key))),
            ],
            rest = [
                $($rest)*
            ]
        )
    };
}

/// Different key bindings depending on the application state
pub enum Keymap {
    Chip8,
}

/// Actions to be executed by the application
#[derive(Debug, PartialEq, Eq)]
pub enum Action {
    KeyDown(Key),
    KeyUp(Key),
    TogglePause,
    Quit,
}

impl Keymap {
    /// Translate and SDL2 event into an action to be executed by the app
    ///
    /// ```text
    /// |1|2|3|C|      |1|2|3|4|
    /// |4|5|6|D|  <-  |Q|W|E|R|
    /// |7|8|9|E|  <-  |A|S|D|F|
    /// |A|0|B|F|      |Z|X|C|V|
    /// ```
    pub fn translate_action(&self, event: &Event) -> Option<Action> {
        match self {
            Keymap::Chip8 => map_keys!(event,
                @keypad Keycode::Num1 => 0x01,
                @keypad Keycode::Num2 => 0x02,
                @keypad Keycode::Num3 => 0x03,
                @keypad Keycode::Num4 => 0x0C,
                @keypad Keycode::Q => 0x04,
                @keypad Keycode::W => 0x05,
                @keypad Keycode::E => 0x06,
                @keypad Keycode::R => 0x0D,
                @keypad Keycode::A => 0x07,
                @keypad Keycode::S => 0x08,
                @keypad Keycode::D => 0x09,
                @keypad Keycode::F => 0x0E,
                @keypad Keycode::Z => 0x0A,
                @keypad Keycode::X => 0x00,
                @keypad Keycode::C => 0x0B,
                @keypad Keycode::V => 0x0F,
                Keycode::Space => Action::TogglePause,
                Keycode::Escape => Action::Quit,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdl2::keyboard::Mod;

    fn key_down(keycode: Keycode) -> Event {
        Event::KeyDown {
            timestamp: 0,
            window_id: 0,
            keycode: Some(keycode),
            scancode: None,
            keymod: Mod::NOMOD,
            repeat: false,
        }
    }

    fn key_up(keycode: Keycode) -> Event {
        Event::KeyUp {
            timestamp: 0,
            window_id: 0,
            keycode: Some(keycode),
            scancode: None,
            keymod: Mod::NOMOD,
            repeat: false,
        }
    }

    #[test]
    fn test_keypad_layout() {
        let keymap = Keymap::Chip8;
        let rows = [
            ([Keycode::Num1, Keycode::Num2, Keycode::Num3, Keycode::Num4], [0x1, 0x2, 0x3, 0xC]),
            ([Keycode::Q, Keycode::W, Keycode::E, Keycode::R], [0x4, 0x5, 0x6, 0xD]),
            ([Keycode::A, Keycode::S, Keycode::D, Keycode::F], [0x7, 0x8, 0x9, 0xE]),
            ([Keycode::Z, Keycode::X, Keycode::C, Keycode::V], [0xA, 0x0, 0xB, 0xF]),
        ];

        for (keycodes, keys) in rows {
            for (keycode, key) in keycodes.into_iter().zip(keys) {
                assert_eq!(
                    keymap.translate_action(&key_down(keycode)),
                    Some(Action::KeyDown(Key::from_nibble(key)))
                );
                assert_eq!(
                    keymap.translate_action(&key_up(keycode)),
                    Some(Action::KeyUp(Key::from_nibble(key)))
                );
            }
        }
    }

    #[test]
    fn test_control_keys() {
        let keymap = Keymap::Chip8;
        assert_eq!(
            keymap.translate_action(&key_down(Keycode::Space)),
            Some(Action::TogglePause)
        );
        assert_eq!(
            keymap.translate_action(&key_down(Keycode::Escape)),
            Some(Action::Quit)
        );
        assert_eq!(keymap.translate_action(&key_up(Keycode::Escape)), None);
    }

    #[test]
    fn test_unmapped_key() {
        let keymap = Keymap::Chip8;
        assert_eq!(keymap.translate_action(&key_down(Keycode::P)), None);
    }
}
