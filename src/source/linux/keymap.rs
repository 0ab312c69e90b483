//! A US keyboard layout for turning evdev key codes into text.

/// The text of a key as `(unshifted, shifted)`.
fn symbols(code: u16) -> Option<(char, char)> {
    let pair = match code {
        2 => ('1', '!'),
        3 => ('2', '@'),
        4 => ('3', '#'),
        5 => ('4', '$'),
        6 => ('5', '%'),
        7 => ('6', '^'),
        8 => ('7', '&'),
        9 => ('8', '*'),
        10 => ('9', '('),
        11 => ('0', ')'),
        12 => ('-', '_'),
        13 => ('=', '+'),
        16 => ('q', 'Q'),
        17 => ('w', 'W'),
        18 => ('e', 'E'),
        19 => ('r', 'R'),
        20 => ('t', 'T'),
        21 => ('y', 'Y'),
        22 => ('u', 'U'),
        23 => ('i', 'I'),
        24 => ('o', 'O'),
        25 => ('p', 'P'),
        26 => ('[', '{'),
        27 => (']', '}'),
        30 => ('a', 'A'),
        31 => ('s', 'S'),
        32 => ('d', 'D'),
        33 => ('f', 'F'),
        34 => ('g', 'G'),
        35 => ('h', 'H'),
        36 => ('j', 'J'),
        37 => ('k', 'K'),
        38 => ('l', 'L'),
        39 => (';', ':'),
        40 => ('\'', '"'),
        41 => ('`', '~'),
        43 => ('\\', '|'),
        44 => ('z', 'Z'),
        45 => ('x', 'X'),
        46 => ('c', 'C'),
        47 => ('v', 'V'),
        48 => ('b', 'B'),
        49 => ('n', 'N'),
        50 => ('m', 'M'),
        51 => (',', '<'),
        52 => ('.', '>'),
        53 => ('/', '?'),
        57 => (' ', ' '),
        _ => return keypad_symbol(code).map(|c| (c, c)),
    };

    Some(pair)
}

fn keypad_symbol(code: u16) -> Option<char> {
    let c = match code {
        55 => '*',
        71 => '7',
        72 => '8',
        73 => '9',
        74 => '-',
        75 => '4',
        76 => '5',
        77 => '6',
        78 => '+',
        79 => '1',
        80 => '2',
        81 => '3',
        82 => '0',
        83 => '.',
        98 => '/',
        117 => '=',
        _ => return None,
    };

    Some(c)
}

/// Whether `code` is a key on the numeric keypad.
pub(crate) fn is_keypad(code: u16) -> bool {
    // KEY_KPENTER has no text but still sits on the keypad
    code == 96 || keypad_symbol(code).is_some()
}

/// The text typed by the key `code`, or `None` for keys that produce none (function keys, arrows,
/// Enter, ...).
pub(crate) fn key_text(code: u16, shift: bool, caps_lock: bool) -> Option<char> {
    let (plain, shifted) = symbols(code)?;

    let use_shifted = if plain.is_ascii_alphabetic() {
        shift != caps_lock
    } else {
        shift
    };

    Some(if use_shifted { shifted } else { plain })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn letters_follow_shift_and_caps_lock() {
        assert_eq!(key_text(30, false, false), Some('a'));
        assert_eq!(key_text(30, true, false), Some('A'));
        assert_eq!(key_text(30, false, true), Some('A'));
        assert_eq!(key_text(30, true, true), Some('a'));
    }

    #[test]
    fn caps_lock_leaves_symbols_alone() {
        assert_eq!(key_text(2, false, true), Some('1'));
        assert_eq!(key_text(2, true, false), Some('!'));
    }

    #[test]
    fn keys_without_text() {
        // KEY_ESC, KEY_ENTER, KEY_F1
        assert_eq!(key_text(1, false, false), None);
        assert_eq!(key_text(28, false, false), None);
        assert_eq!(key_text(59, false, false), None);
    }

    #[test]
    fn keypad_keys() {
        assert!(is_keypad(79));
        assert!(is_keypad(96));
        assert!(!is_keypad(2));
        assert_eq!(key_text(79, true, false), Some('1'));
    }
}
