//! Built-in card content used when a session is created without decks.

pub const DEFAULT_BLACK_DECK: &[&str] = &[
    "What did I bring back from my vacation?",
    "The secret ingredient in grandma's soup is ____.",
    "What's keeping the office printer from working?",
    "My superpower is ____.",
    "The next big startup idea: ____ as a service.",
    "What's the worst thing to find in your sandwich?",
    "Scientists have finally discovered the cause of Mondays: ____.",
    "What's my landlord hiding in the basement?",
    "The new museum exhibit is dedicated entirely to ____.",
    "What got me kicked out of the library?",
    "Coming soon to theaters: ____, the musical.",
    "My fitness routine consists mostly of ____.",
    "What will the aliens think of first?",
    "The best way to end a first date is ____.",
    "What's the real reason the dinosaurs went extinct?",
    "Instead of coal, Santa now gives bad children ____.",
    "The school's new mascot is ____.",
    "What did the fortune cookie say?",
    "I never leave home without ____.",
    "What's that smell coming from the break room?",
    "The theme of this year's family reunion: ____.",
    "What's the last thing you want to hear from your pilot?",
    "The wizard's spellbook is mostly recipes for ____.",
    "What ruined the wedding?",
];

pub const DEFAULT_WHITE_DECK: &[&str] = &[
    "A suspiciously large spoon.",
    "Interpretive dance.",
    "A raccoon with a business plan.",
    "Forgetting the lyrics halfway through.",
    "Three kids in a trench coat.",
    "An unsolicited podcast recommendation.",
    "Cold pizza for breakfast.",
    "A motivational speech from a goat.",
    "The sound of dial-up internet.",
    "A haunted vending machine.",
    "Socks with sandals.",
    "An aggressively friendly neighbor.",
    "Glitter. Everywhere.",
    "A very dramatic sneeze.",
    "Accidentally replying all.",
    "The group chat.",
    "A tiny hat for a tiny horse.",
    "Mild disappointment.",
    "A self-aware toaster.",
    "Running late on purpose.",
    "Pineapple on everything.",
    "A karaoke machine with no off switch.",
    "An overdue library book from 1987.",
    "Competitive napping.",
    "A wizard who only knows one spell.",
    "Elevator music.",
    "The last slice of cake.",
    "A parrot that knows too much.",
    "Inflatable furniture.",
    "An emotional support cactus.",
    "A sudden urge to alphabetize.",
    "Doing the robot at a funeral.",
    "A lifetime supply of rubber ducks.",
    "Someone else's homework.",
    "A surprise tax audit.",
    "Pretending to understand modern art.",
    "A sock puppet army.",
    "The world's slowest escalator.",
    "A conspiracy of pigeons.",
    "Microwave fish in the office.",
    "An extremely long voicemail.",
    "Buttered toast, landing face down.",
    "A cardboard castle.",
    "Unexpected bagpipes.",
    "A llama in sunglasses.",
    "Forty-seven browser tabs.",
    "A passive-aggressive sticky note.",
    "The wrong kind of cheese.",
    "A space cowboy.",
    "Too many throw pillows.",
    "Arguing with a GPS.",
    "A trampoline in the living room.",
    "The smell of new shoes.",
    "Homemade fireworks.",
    "A robot vacuum with ambition.",
    "Mismatched gloves.",
    "A dragon who is afraid of heights.",
    "A surprise marching band.",
    "Reading the terms and conditions.",
    "An unreasonably loud kazoo.",
    "A cat that thinks it's a dog.",
    "Waking up on the wrong side of the bed.",
    "Eating cereal with a fork.",
    "A treasure map drawn in crayon.",
    "An accidental mustache.",
    "A pirate with seasickness.",
    "Dad jokes at a job interview.",
    "The floor is lava.",
    "A mysterious humming noise.",
    "A stuck zipper.",
    "Marshmallow diplomacy.",
    "A ghost that just wants a hug.",
    "Too much hot sauce.",
    "A polka remix.",
    "A walrus in a tuxedo.",
    "Spontaneous applause.",
    "The wrong birthday cake.",
    "An over-caffeinated squirrel.",
    "Laughing at your own joke.",
    "A chandelier made of spoons.",
];

/// Owned copies of the default decks, as `(white, black)`.
pub fn default_decks() -> (Vec<String>, Vec<String>) {
    (
        DEFAULT_WHITE_DECK.iter().map(|s| (*s).to_string()).collect(),
        DEFAULT_BLACK_DECK.iter().map(|s| (*s).to_string()).collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::constants::HAND_SIZE;
    use std::collections::HashSet;

    #[test]
    fn test_default_decks_support_several_players() {
        assert!(DEFAULT_WHITE_DECK.len() / HAND_SIZE >= 4);
        assert!(!DEFAULT_BLACK_DECK.is_empty());
    }

    #[test]
    fn test_default_white_deck_has_no_duplicates() {
        let unique: HashSet<&&str> = DEFAULT_WHITE_DECK.iter().collect();
        assert_eq!(unique.len(), DEFAULT_WHITE_DECK.len());
    }
}
