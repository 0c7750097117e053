//! Static, layout-independent display names for scan codes.
//!
//! Used whenever a backend has no live layout data for a key.  The names
//! describe the key's position on a US ANSI keyboard ("Quotes", "Tilde",
//! "Question") rather than the character a foreign layout would produce.

use super::scancode::ScanCode;

/// Returns the hardware-position label for `sc`, or `""` if none is known.
pub fn scan_code_label(sc: ScanCode) -> &'static str {
    match sc {
        ScanCode::ESCAPE => "Escape",
        ScanCode::DIGIT1 => "1",
        ScanCode::DIGIT2 => "2",
        ScanCode::DIGIT3 => "3",
        ScanCode::DIGIT4 => "4",
        ScanCode::DIGIT5 => "5",
        ScanCode::DIGIT6 => "6",
        ScanCode::DIGIT7 => "7",
        ScanCode::DIGIT8 => "8",
        ScanCode::DIGIT9 => "9",
        ScanCode::DIGIT0 => "0",
        ScanCode::MINUS => "Minus",
        ScanCode::EQUALS => "Equals",
        ScanCode::BACKSPACE => "Backspace",
        ScanCode::TAB => "Tab",
        ScanCode::Q => "Q",
        ScanCode::W => "W",
        ScanCode::E => "E",
        ScanCode::R => "R",
        ScanCode::T => "T",
        ScanCode::Y => "Y",
        ScanCode::U => "U",
        ScanCode::I => "I",
        ScanCode::O => "O",
        ScanCode::P => "P",
        ScanCode::LEFTBRACKET => "Left Bracket",
        ScanCode::RIGHTBRACKET => "Right Bracket",
        ScanCode::ENTER => "Enter",
        ScanCode::LEFTCONTROL => "Left Control",
        ScanCode::A => "A",
        ScanCode::S => "S",
        ScanCode::D => "D",
        ScanCode::F => "F",
        ScanCode::G => "G",
        ScanCode::H => "H",
        ScanCode::J => "J",
        ScanCode::K => "K",
        ScanCode::L => "L",
        ScanCode::SEMICOLON => "Semicolon",
        ScanCode::APOSTROPHE => "Quotes",
        ScanCode::GRAVE => "Tilde",
        ScanCode::LEFTSHIFT => "Left Shift",
        ScanCode::BACKSLASH => "Pipe",
        ScanCode::Z => "Z",
        ScanCode::X => "X",
        ScanCode::C => "C",
        ScanCode::V => "V",
        ScanCode::B => "B",
        ScanCode::N => "N",
        ScanCode::M => "M",
        ScanCode::COMMA => "Comma",
        ScanCode::PERIOD => "Period",
        ScanCode::SLASH => "Question",
        ScanCode::RIGHTSHIFT => "Right Shift",
        ScanCode::MULTIPLY => "Multiply",
        ScanCode::LEFTALT => "Left Alt",
        ScanCode::SPACEBAR => "Spacebar",
        ScanCode::CAPSLOCK => "Caps Lock",
        ScanCode::F1 => "F1",
        ScanCode::F2 => "F2",
        ScanCode::F3 => "F3",
        ScanCode::F4 => "F4",
        ScanCode::F5 => "F5",
        ScanCode::F6 => "F6",
        ScanCode::F7 => "F7",
        ScanCode::F8 => "F8",
        ScanCode::F9 => "F9",
        ScanCode::F10 => "F10",
        ScanCode::NUMLOCK => "Num Lock",
        ScanCode::SCROLLLOCK => "Scroll Lock",
        ScanCode::NUMPAD7 => "Numpad 7",
        ScanCode::NUMPAD8 => "Numpad 8",
        ScanCode::NUMPAD9 => "Numpad 9",
        ScanCode::SUBSTRACT => "Substract",
        ScanCode::NUMPAD4 => "Numpad 4",
        ScanCode::NUMPAD5 => "Numpad 5",
        ScanCode::NUMPAD6 => "Numpad 6",
        ScanCode::ADD => "Add",
        ScanCode::NUMPAD1 => "Numpad 1",
        ScanCode::NUMPAD2 => "Numpad 2",
        ScanCode::NUMPAD3 => "Numpad 3",
        ScanCode::NUMPAD0 => "Numpad 0",
        ScanCode::DECIMAL => "Decimal",
        // The 102nd key has no stable position name across ISO layouts.
        ScanCode::EUROPE2 => "",
        ScanCode::F11 => "F11",
        ScanCode::F12 => "F12",
        ScanCode::INTL1 => "Intl 1",
        ScanCode::LANG3 => "Lang 3",
        ScanCode::LANG4 => "Lang 4",
        ScanCode::INTL4 => "Intl 4",
        ScanCode::INTL2 => "Intl 2",
        ScanCode::INTL5 => "Intl 5",
        ScanCode::INTL6 => "Intl 6",
        ScanCode::NUMPADENTER => "Numpad Enter",
        ScanCode::RIGHTCONTROL => "Right Control",
        ScanCode::DIVIDE => "Divide",
        ScanCode::PRINTSCREEN => "Print Screen",
        ScanCode::RIGHTALT => "Right Alt",
        ScanCode::HOME => "Home",
        ScanCode::UP => "Up",
        ScanCode::PAGEUP => "Page Up",
        ScanCode::LEFT => "Left",
        ScanCode::RIGHT => "Right",
        ScanCode::END => "End",
        ScanCode::DOWN => "Down",
        ScanCode::PAGEDOWN => "Page Down",
        ScanCode::INSERT => "Insert",
        ScanCode::DELETE => "Delete",
        ScanCode::MUTE => "Mute",
        ScanCode::VOLUMEDOWN => "Volume Down",
        ScanCode::VOLUMEUP => "Volume Up",
        ScanCode::POWER => "Power",
        ScanCode::NUMPADEQUALS => "Numpad Equals",
        ScanCode::PAUSE => "Pause",
        ScanCode::SEPARATOR => "Separator",
        ScanCode::INTL3 => "Intl 3",
        ScanCode::LEFTGUI => "Left Super",
        ScanCode::RIGHTGUI => "Right Super",
        ScanCode::STOP => "Stop",
        ScanCode::APPS => "Menu",
        ScanCode::CALCULATOR => "Calculator",
        ScanCode::SLEEP => "Sleep",
        ScanCode::WAKE => "Wake",
        ScanCode::MAIL => "Mail",
        ScanCode::BROWSERFAVORITES => "Favorites",
        ScanCode::MYCOMPUTER => "Computer",
        ScanCode::BROWSERBACK => "Back",
        ScanCode::BROWSERFORWARD => "Forward",
        ScanCode::NEXTTRACK => "Next Track",
        ScanCode::PLAYPAUSE => "Play/Pause",
        ScanCode::PREVTRACK => "Prev Track",
        ScanCode::BROWSERHOME => "Browser Home",
        ScanCode::BROWSERREFRESH => "Refresh",
        ScanCode::F13 => "F13",
        ScanCode::F14 => "F14",
        ScanCode::F15 => "F15",
        ScanCode::F16 => "F16",
        ScanCode::F17 => "F17",
        ScanCode::F18 => "F18",
        ScanCode::F19 => "F19",
        ScanCode::F20 => "F20",
        ScanCode::F21 => "F21",
        ScanCode::F22 => "F22",
        ScanCode::F23 => "F23",
        ScanCode::F24 => "F24",
        ScanCode::BROWSERSEARCH => "Search",
        ScanCode::MEDIASELECT => "Media",
        _ => "",
    }
}
