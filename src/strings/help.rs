//! # Help Text
//!
//! Displayed to the user via the `/help` and `/start` commands.

pub const MAIN: &str = concat!(
    "Ich melde neue Folgen der beobachteten Podcasts.\n",
    "\n",
    "/feeds: Alle Feeds mit Nummer auflisten\n",
    "/letzteEpisode [Nummer]: Letzte Folge eines Feeds\n",
    "/findeStichwort [Nummer] Stichwort: Folgen zu einem Stichwort finden\n",
);

/// Extra commands available for Methodisch inkorrekt.
pub const MINKORREKT: &str = concat!(
    "/themenVonFolgeX Folge: Themen einer Folge\n",
    "/keks: Ein zufälliger Keks\n",
    "/crowsay [Text]: Die Krähe spricht\n",
);

pub const DEBUG: &str = "/debugNewEpisode [Sekunden]: Neue Folgen sofort melden\n";
