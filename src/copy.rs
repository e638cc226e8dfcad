//! Italian user-facing copy
//!
//! Plain data; nothing here affects behavior.

pub const BRAND: &str = "MOB.LOTTO 4.0";
pub const TAGLINE: &str = "Sistema di gioco telefonico a costo fisso con vincite fino a €100.000";
pub const GAME_SUBTITLE: &str = "Simulazione del sistema di gioco telefonico";

pub const PHONE_REQUIRED_TITLE: &str = "Numero richiesto";
pub const PHONE_REQUIRED_MESSAGE: &str = "Inserisci il tuo numero di telefono per giocare";

pub const DIALING_TITLE: &str = "Chiamata in corso";
pub const DIALING_MESSAGE: &str = "Stiamo connettendo la tua chiamata...";

pub const CONNECTED_TITLE: &str = "Connessione stabilita";
pub const CONNECTED_MESSAGE: &str = "Benvenuto a MOB.LOTTO 4.0";

pub const AUDIO_UNAVAILABLE_TITLE: &str = "Audio non disponibile";
pub const AUDIO_UNAVAILABLE_MESSAGE: &str = "Il gioco prosegue senza effetti sonori";

pub const CALL_COST: &str = "Costo chiamata: €1";

pub const HOW_TO_PLAY: [&str; 3] = [
    "Chiama il numero dedicato o usa il simulatore",
    "Segui le istruzioni IVR",
    "Vinci fino a €100.000!",
];

pub const GUARANTEES: [(&str, &str); 3] = [
    ("Anonimizzazione", "Separazione tra ID tecnico e dati personali"),
    ("Audit trail", "Tracciabilità completa delle estrazioni"),
    ("Vincite sicure", "Sistema di riscossione controllato"),
];

/// Steps of the IVR flow card: title, description
pub const IVR_STEPS: [(&str, &str); 5] = [
    ("Chiamata in ingresso", "L'utente chiama il numero dedicato"),
    ("Verifica maggiore età", "Messaggio IVR obbligatorio"),
    ("Conferma partecipazione", "Premere 3 per confermare"),
    ("Estrazione casuale", "Determinazione vincita"),
    ("Annuncio risultato", "Comunicazione vincita/perdita"),
];

pub const RULES_TITLE: &str = "Regolamento MOB.LOTTO 4.0";
pub const RULES_SUBTITLE: &str = "Leggi attentamente le condizioni di partecipazione";

/// Rules page sections: heading, then (item, text) pairs
pub const RULES: [(&str, [(&str, &str); 3]); 4] = [
    (
        "Condizioni di partecipazione",
        [
            (
                "Requisiti di età",
                "La partecipazione è consentita esclusivamente a persone maggiorenni (18+ anni).",
            ),
            (
                "Verifica obbligatoria",
                "Ogni chiamata viene sottoposta a verifica IVR per confermare il requisito di età.",
            ),
            (
                "Costo della chiamata",
                "Il costo fisso per ogni chiamata è di €1, indipendentemente dall'esito del gioco.",
            ),
        ],
    ),
    (
        "Modalità di gioco",
        [
            (
                "Estrazione casuale",
                "Il risultato viene determinato tramite generatore di numeri casuali (RNG).",
            ),
            (
                "Vincite",
                "Vincite standard: €5.000-€10.000. Jackpot una tantum: €100.000.",
            ),
            (
                "Tracciabilità",
                "Tutti gli eventi di gioco vengono registrati per garantire trasparenza e sicurezza.",
            ),
        ],
    ),
    (
        "Garanzie e responsabilità",
        [
            (
                "Anonimizzazione",
                "I dati personali vengono separati dall'ID tecnico per garantire la privacy.",
            ),
            (
                "Audit trail",
                "È garantita la tracciabilità completa delle estrazioni e dei risultati.",
            ),
            (
                "Riscossione vincite",
                "Le procedure di riscossione sono gestite tramite sistema controllato.",
            ),
        ],
    ),
    (
        "Informazioni aggiuntive",
        [
            (
                "Responsabilità",
                "Il sistema declina ogni responsabilità per uso improprio o violazione delle condizioni.",
            ),
            (
                "Modifiche",
                "Il regolamento può essere modificato in qualsiasi momento senza preavviso.",
            ),
            (
                "Assistenza",
                "Per qualsiasi domanda, contattare il servizio clienti dedicato.",
            ),
        ],
    ),
];

pub const RULES_CONSENT: &str =
    "Dichiaro di aver letto e compreso il regolamento e accetto tutte le condizioni di partecipazione.";

pub const IDLE_INTRO: &str =
    "Benvenuto nel sistema MOB.LOTTO 4.0. Premi il pulsante per simulare una chiamata.";
pub const GAME_FLOW: [&str; 4] = [
    "Connessione al sistema",
    "Messaggio IVR di conferma",
    "Estrazione casuale",
    "Annuncio risultato",
];

pub const CONNECTING_TITLE: &str = "Connessione in corso...";
pub const CONNECTING_MESSAGE: &str = "Stiamo connettendo la tua chiamata al sistema MOB.LOTTO";

pub const IVR_TITLE: &str = "Messaggio IVR";
pub const IVR_SCRIPT: [&str; 3] = [
    "Benvenuto a MOB.LOTTO 4.0",
    "Il costo di questa chiamata è di 1 euro.",
    "Per confermare di avere almeno 18 anni e partecipare, premi 3.",
];

pub const PLAYING_TITLE: &str = "Estrazione in corso";
pub const PLAYING_MESSAGE: &str = "Determinazione del risultato...";

pub const WIN_TITLE: &str = "HAI VINTO!";
pub const WIN_MESSAGE: &str = "Complimenti! Sei un vincitore fortunato.";
pub const WIN_FOLLOWUP: &str = "Un operatore ti contatterà per le procedure di riscossione.";
pub const LOSE_TITLE: &str = "RITENTA!";
pub const LOSE_MESSAGE: &str = "Non hai vinto questa volta. Riprova per tentare la fortuna!";

/// Format a euro amount with Italian thousands separators, e.g. `€100.000`
pub fn format_euro(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    format!("€{grouped}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_euro() {
        assert_eq!(format_euro(0), "€0");
        assert_eq!(format_euro(999), "€999");
        assert_eq!(format_euro(5000), "€5.000");
        assert_eq!(format_euro(75_000), "€75.000");
        assert_eq!(format_euro(100_000), "€100.000");
        assert_eq!(format_euro(1_234_567), "€1.234.567");
    }
}
