//! Curated merchant directory mapping bank-feed text to canonical domains.
//!
//! Two ordered tables drive resolution: exact substring entries and fuzzy regex patterns.
//! Order is significant and first match wins, so specific labels sit above the general ones
//! they contain (e.g. "uber eats" above "uber"). Short labels that would false-match inside
//! longer words ("aldi" in "vivaldi", "agl" in "eagle") live in the fuzzy table behind word
//! boundaries instead.

use regex::Regex;

/// Ordered exact entries, grouped by category. A normalized transaction string matches an
/// entry when it contains the label anywhere.
pub(crate) const EXACT_DOMAINS: &[(&str, &str)] = &[
    // Retail and groceries
    ("woolworths", "woolworths.com.au"),
    ("woolies", "woolworths.com.au"),
    ("coles", "coles.com.au"),
    ("kmart", "kmart.com.au"),
    ("target australia", "target.com.au"),
    ("bunnings", "bunnings.com.au"),
    ("officeworks", "officeworks.com.au"),
    ("myer", "myer.com.au"),
    ("david jones", "davidjones.com"),
    ("jb hi fi", "jbhifi.com.au"),
    ("jbhifi", "jbhifi.com.au"),
    ("harvey norman", "harveynorman.com.au"),
    ("the good guys", "thegoodguys.com.au"),
    ("good guys", "thegoodguys.com.au"),
    ("amazon", "amazon.com"),
    ("ebay", "ebay.com.au"),
    ("catch of the day", "catch.com.au"),
    ("costco", "costco.com.au"),
    ("rebel sport", "rebelsport.com.au"),
    ("anaconda", "anacondastores.com"),
    ("bcf", "bcf.com.au"),
    ("spotlight", "spotlightstores.com"),
    ("the reject shop", "rejectshop.com.au"),
    ("reject shop", "rejectshop.com.au"),
    ("dan murphy", "danmurphys.com.au"),
    ("bws", "bws.com.au"),
    ("liquorland", "liquorland.com.au"),
    ("first choice liquor", "firstchoiceliquor.com.au"),
    ("petbarn", "petbarn.com.au"),
    ("petstock", "petstock.com.au"),
    ("pet circle", "petcircle.com.au"),
    // Food and drink
    ("mcdonalds", "mcdonalds.com"),
    ("kfc", "kfc.com.au"),
    ("hungry jack", "hungryjacks.com.au"),
    ("subway", "subway.com"),
    ("domino", "dominos.com.au"),
    ("pizza hut", "pizzahut.com.au"),
    ("grill'd", "grilld.com.au"),
    ("grilld", "grilld.com.au"),
    ("guzman", "guzmanygomez.com.au"),
    ("zambrero", "zambrero.com.au"),
    ("oporto", "oporto.com.au"),
    ("red rooster", "redrooster.com.au"),
    ("nando", "nandos.com.au"),
    ("boost juice", "boostjuice.com.au"),
    ("gloria jean", "gloriajeanscoffees.com.au"),
    ("starbucks", "starbucks.com.au"),
    ("the coffee club", "coffeeclub.com.au"),
    ("coffee club", "coffeeclub.com.au"),
    ("blue bottle", "bluebottlecoffee.com"),
    ("whole foods", "wholefoodsmarket.com"),
    ("hawkers", "hawkers.com.au"),
    ("betty's burgers", "bettysburgers.com.au"),
    ("bettys burgers", "bettysburgers.com.au"),
    ("schnitz", "schnitz.com.au"),
    ("roll'd", "rolld.com.au"),
    ("rolld", "rolld.com.au"),
    ("sushi hub", "sushihub.com.au"),
    ("mad mex", "madmex.com.au"),
    ("menulog", "menulog.com.au"),
    ("uber eats", "ubereats.com"),
    ("doordash", "doordash.com"),
    ("deliveroo", "deliveroo.com.au"),
    ("hellofresh", "hellofresh.com.au"),
    ("marley spoon", "marleyspoon.com.au"),
    ("youfoodz", "youfoodz.com"),
    ("milkrun", "milkrun.com"),
    // Tech and subscriptions
    ("apple", "apple.com"),
    ("apple.com/bill", "apple.com"),
    ("itunes", "apple.com"),
    ("spotify", "spotify.com"),
    ("netflix", "netflix.com"),
    ("disney", "disneyplus.com"),
    ("binge", "binge.com.au"),
    ("kayo", "kayosports.com.au"),
    ("paramount", "paramountplus.com"),
    ("prime video", "primevideo.com"),
    ("youtube", "youtube.com"),
    ("google", "google.com"),
    ("microsoft", "microsoft.com"),
    ("adobe", "adobe.com"),
    ("dropbox", "dropbox.com"),
    ("github", "github.com"),
    ("openai", "openai.com"),
    ("zoom", "zoom.us"),
    ("slack", "slack.com"),
    ("notion", "notion.so"),
    ("figma", "figma.com"),
    ("atlassian", "atlassian.com"),
    ("audible", "audible.com.au"),
    ("twitch", "twitch.tv"),
    // Banking and payments
    ("paypal", "paypal.com"),
    ("afterpay", "afterpay.com"),
    ("zip pay", "zip.co"),
    ("zippay", "zip.co"),
    ("klarna", "klarna.com"),
    ("stripe", "stripe.com"),
    ("squareup", "squareup.com"),
    ("revolut", "revolut.com"),
    ("commbank", "commbank.com.au"),
    ("commonwealth bank", "commbank.com.au"),
    ("westpac", "westpac.com.au"),
    ("st george", "stgeorge.com.au"),
    ("macquarie bank", "macquarie.com.au"),
    ("bendigo bank", "bendigobank.com.au"),
    ("bank of melbourne", "bankofmelbourne.com.au"),
    ("great southern bank", "greatsouthernbank.com.au"),
    ("suncorp", "suncorp.com.au"),
    ("beem it", "beemit.com.au"),
    ("raiz", "raizinvest.com.au"),
    ("spaceship", "spaceship.com.au"),
    ("coinbase", "coinbase.com"),
    ("binance", "binance.com"),
    // Transport and travel
    ("uber", "uber.com"),
    ("didi", "didiglobal.com"),
    ("13cabs", "13cabs.com.au"),
    ("transport for nsw", "transportnsw.info"),
    ("translink", "translink.com.au"),
    ("qantas", "qantas.com"),
    ("jetstar", "jetstar.com"),
    ("virgin australia", "virginaustralia.com"),
    ("rex airlines", "rex.com.au"),
    ("europcar", "europcar.com.au"),
    ("hertz", "hertz.com.au"),
    ("linkt", "linkt.com.au"),
    ("ampol", "ampol.com.au"),
    ("caltex", "caltex.com.au"),
    ("7-eleven", "7eleven.com.au"),
    ("united petroleum", "unitedpetroleum.com.au"),
    ("shell", "shell.com.au"),
    ("airbnb", "airbnb.com"),
    ("agoda", "agoda.com"),
    ("expedia", "expedia.com.au"),
    ("wotif", "wotif.com"),
    ("webjet", "webjet.com.au"),
    // Utilities and telcos
    ("origin energy", "originenergy.com.au"),
    ("energyaustralia", "energyaustralia.com.au"),
    ("energy australia", "energyaustralia.com.au"),
    ("red energy", "redenergy.com.au"),
    ("alinta", "alintaenergy.com.au"),
    ("sydney water", "sydneywater.com.au"),
    ("yarra valley water", "yvw.com.au"),
    ("telstra", "telstra.com.au"),
    ("optus", "optus.com.au"),
    ("vodafone", "vodafone.com.au"),
    ("tpg", "tpg.com.au"),
    ("iinet", "iinet.net.au"),
    ("aussie broadband", "aussiebroadband.com.au"),
    ("amaysim", "amaysim.com.au"),
    ("boost mobile", "boost.com.au"),
    // Health and fitness
    ("chemist warehouse", "chemistwarehouse.com.au"),
    ("priceline", "priceline.com.au"),
    ("terry white", "terrywhitechemmart.com.au"),
    ("amcal", "amcal.com.au"),
    ("bupa", "bupa.com.au"),
    ("medibank", "medibank.com.au"),
    ("hcf", "hcf.com.au"),
    ("specsavers", "specsavers.com.au"),
    ("opsm", "opsm.com.au"),
    ("bailey nelson", "baileynelson.com.au"),
    ("anytime fitness", "anytimefitness.com.au"),
    ("goodlife", "goodlifehealthclubs.com.au"),
    ("jetts", "jetts.com.au"),
    ("fitness first", "fitnessfirst.com.au"),
    ("classpass", "classpass.com"),
    // Gaming
    ("playstation", "playstation.com"),
    ("xbox", "xbox.com"),
    ("nintendo", "nintendo.com"),
    ("steamgames", "steampowered.com"),
    ("epic games", "epicgames.com"),
    ("riot games", "riotgames.com"),
    ("blizzard", "blizzard.com"),
    ("humble bundle", "humblebundle.com"),
    // Automotive and insurance
    ("supercheap auto", "supercheapauto.com.au"),
    ("autobarn", "autobarn.com.au"),
    ("repco", "repco.com.au"),
    ("nrma", "nrma.com.au"),
    ("racv", "racv.com.au"),
    ("racq", "racq.com.au"),
    ("aami", "aami.com.au"),
    ("youi", "youi.com.au"),
    ("budget direct", "budgetdirect.com.au"),
    ("allianz", "allianz.com.au"),
    ("shannons", "shannons.com.au"),
    ("mycar", "mycar.com.au"),
    ("ultra tune", "ultratune.com.au"),
    // Fashion
    ("cotton on", "cottonon.com"),
    ("uniqlo", "uniqlo.com"),
    ("h&m", "hm.com"),
    ("zara", "zara.com"),
    ("the iconic", "theiconic.com.au"),
    ("asos", "asos.com"),
    ("country road", "countryroad.com.au"),
    ("bonds", "bonds.com.au"),
    ("best & less", "bestandless.com.au"),
    ("best and less", "bestandless.com.au"),
    ("lorna jane", "lornajane.com.au"),
    ("gymshark", "gymshark.com"),
    ("culture kings", "culturekings.com.au"),
    ("universal store", "universalstore.com"),
    ("platypus", "platypusshoes.com.au"),
    ("hype dc", "hypedc.com"),
    ("nike", "nike.com"),
    ("adidas", "adidas.com"),
    ("foot locker", "footlocker.com.au"),
    ("footlocker", "footlocker.com.au"),
    // Home
    ("ikea", "ikea.com"),
    ("freedom furniture", "freedom.com.au"),
    ("fantastic furniture", "fantasticfurniture.com.au"),
    ("temple & webster", "templeandwebster.com.au"),
    ("temple and webster", "templeandwebster.com.au"),
    ("adairs", "adairs.com.au"),
    ("bed bath n table", "bedbathntable.com.au"),
    ("pillow talk", "pillowtalk.com.au"),
    ("mitre 10", "mitre10.com.au"),
    ("mitre10", "mitre10.com.au"),
    ("total tools", "totaltools.com.au"),
    ("sydney tools", "sydneytools.com.au"),
    // Education
    ("udemy", "udemy.com"),
    ("coursera", "coursera.org"),
    ("skillshare", "skillshare.com"),
    ("masterclass", "masterclass.com"),
    ("open universities", "open.edu.au"),
    ("tafe", "tafensw.edu.au"),
    ("duolingo", "duolingo.com"),
    // Government
    ("service nsw", "service.nsw.gov.au"),
    ("services australia", "servicesaustralia.gov.au"),
    ("australian taxation office", "ato.gov.au"),
    ("medicare", "servicesaustralia.gov.au"),
    ("centrelink", "servicesaustralia.gov.au"),
    ("australia post", "auspost.com.au"),
    ("auspost", "auspost.com.au"),
    ("vicroads", "vicroads.vic.gov.au"),
    ("service victoria", "service.vic.gov.au"),
    // Entertainment and events
    ("event cinemas", "eventcinemas.com.au"),
    ("hoyts", "hoyts.com.au"),
    ("village cinemas", "villagecinemas.com.au"),
    ("palace cinemas", "palacecinemas.com.au"),
    ("imax", "imax.com"),
    ("ticketek", "ticketek.com.au"),
    ("ticketmaster", "ticketmaster.com.au"),
    ("moshtix", "moshtix.com.au"),
    ("eventbrite", "eventbrite.com"),
];

/// Ordered fuzzy patterns for spelling variants, abbreviations and labels too short to match
/// safely as substrings. Inputs are already normalized to lowercase.
pub(crate) const FUZZY_DOMAINS: &[(&str, &str)] = &[
    (r"apple(\.com)?", "apple.com"),
    (r"apple\.com/bill|itunes\.com/bill|apple\s*care", "apple.com"),
    (r"spotify", "spotify.com"),
    (r"uber\s*eats", "ubereats.com"),
    (r"uber", "uber.com"),
    (r"paypal", "paypal.com"),
    (r"amazon", "amazon.com"),
    (r"mcdonald|maccas", "mcdonalds.com"),
    (r"woolworth|woolies", "woolworths.com.au"),
    (r"coles\s*express|coles", "coles.com.au"),
    (r"oporto", "oporto.com.au"),
    (r"blue\s*bottle", "bluebottlecoffee.com"),
    (r"whole\s*foods", "wholefoodsmarket.com"),
    (r"playstation|ps\s*plus|ps\s*store", "playstation.com"),
    (r"dan\s*murphy", "danmurphys.com.au"),
    (r"event\s*cinemas|event\s*george", "eventcinemas.com.au"),
    (r"hawkers", "hawkers.com.au"),
    (r"jb\s*hi\s*-?\s*fi|jbhifi", "jbhifi.com.au"),
    (r"hungry\s*jack", "hungryjacks.com.au"),
    (r"\bgyg\b", "guzmanygomez.com.au"),
    (r"7[\s-]*eleven", "7eleven.com.au"),
    (r"\baldi\b", "aldi.com.au"),
    (r"\biga\b", "iga.com.au"),
    (r"\btarget\b", "target.com.au"),
    (r"\bbig\s?w\b", "bigw.com.au"),
    (r"\brebel\b", "rebelsport.com.au"),
    (r"\banz\b", "anz.com.au"),
    (r"\bnab\b", "nab.com.au"),
    (r"\bing\b", "ing.com.au"),
    (r"\bwise\b", "wise.com"),
    (r"\bstake\b", "hellostake.com"),
    (r"\bbeem\b", "beemit.com.au"),
    (r"\bsq\b", "squareup.com"),
    (r"\bzip\b", "zip.co"),
    (r"\bbp\b", "bp.com"),
    (r"\bmobil\b", "mobil.com.au"),
    (r"\bopal\b", "opal.com.au"),
    (r"\bmyki\b", "ptv.vic.gov.au"),
    (r"\bola\b", "ola.com.au"),
    (r"\blime\b", "li.me"),
    (r"\bbeam\b", "ridebeam.com"),
    (r"\bavis\b", "avis.com.au"),
    (r"\bagl\b", "agl.com.au"),
    (r"\bergon\b", "ergon.com.au"),
    (r"\bbelong\b", "belong.com.au"),
    (r"\bnib\b", "nib.com.au"),
    (r"\bahm\b", "ahm.com.au"),
    (r"\bf45\b", "f45training.com"),
    (r"\bsteam\b", "steampowered.com"),
    (r"\bstan\b", "stan.com.au"),
    (r"\biconic\b", "theiconic.com.au"),
    (r"\bato\b", "ato.gov.au"),
];

/// Matches a literal `name.tld` in free text, including multi-label endings like `.com.au`
/// and `.gov.au`.
const DOMAIN_PATTERN: &str = r"([a-z0-9-]+\.[a-z]{2,}(?:\.[a-z]{2,})?)";

/// The curated tables with their patterns compiled. Construct once and share; compilation of
/// the fuzzy table is the only non-trivial cost.
pub(crate) struct MerchantDirectory {
    fuzzy: Vec<(Regex, &'static str)>,
    literal: Regex,
}

impl MerchantDirectory {
    pub(crate) fn new() -> Self {
        let fuzzy = FUZZY_DOMAINS
            .iter()
            .map(|(pattern, domain)| {
                let regex = Regex::new(pattern).expect("static merchant pattern must compile");
                (regex, *domain)
            })
            .collect();
        let literal = Regex::new(DOMAIN_PATTERN).expect("static domain pattern must compile");
        Self { fuzzy, literal }
    }

    /// First exact entry whose label occurs in `combined`.
    pub(crate) fn exact_match(&self, combined: &str) -> Option<&'static str> {
        EXACT_DOMAINS
            .iter()
            .find(|(label, _)| combined.contains(label))
            .map(|(_, domain)| *domain)
    }

    /// First fuzzy pattern that matches `combined`.
    pub(crate) fn fuzzy_match(&self, combined: &str) -> Option<&'static str> {
        self.fuzzy
            .iter()
            .find(|(pattern, _)| pattern.is_match(combined))
            .map(|(_, domain)| *domain)
    }

    /// A literal domain written out in the text itself, e.g. "sp booking.com sydney".
    pub(crate) fn extract_literal(&self, combined: &str) -> Option<String> {
        self.literal
            .captures(combined)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }
}

impl Default for MerchantDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_is_substring_based() {
        let directory = MerchantDirectory::new();
        assert_eq!(
            directory.exact_match("woolworths metro sydney"),
            Some("woolworths.com.au")
        );
        assert_eq!(directory.exact_match("dan murphy's online"), Some("danmurphys.com.au"));
        assert_eq!(directory.exact_match("some unknown cafe"), None);
    }

    #[test]
    fn test_exact_specific_labels_win_over_general() {
        let directory = MerchantDirectory::new();
        // "uber eats" sits above "uber" so the food order resolves to the right brand.
        assert_eq!(directory.exact_match("uber eats pty ltd"), Some("ubereats.com"));
        assert_eq!(directory.exact_match("uber trip help.uber.com"), Some("uber.com"));
    }

    #[test]
    fn test_fuzzy_word_boundaries() {
        let directory = MerchantDirectory::new();
        assert_eq!(directory.fuzzy_match("aldi stores 123"), Some("aldi.com.au"));
        // "vivaldi" must not read as the supermarket.
        assert_eq!(directory.fuzzy_match("vivaldi ristorante"), None);
        assert_eq!(directory.fuzzy_match("eagle boys pizza"), None);
        assert_eq!(directory.fuzzy_match("agl electricity"), Some("agl.com.au"));
    }

    #[test]
    fn test_fuzzy_spelling_variants() {
        let directory = MerchantDirectory::new();
        assert_eq!(directory.fuzzy_match("jb hi-fi perth"), Some("jbhifi.com.au"));
        assert_eq!(directory.fuzzy_match("maccas drive thru"), Some("mcdonalds.com"));
        assert_eq!(directory.fuzzy_match("7 eleven richmond"), Some("7eleven.com.au"));
        assert_eq!(directory.fuzzy_match("ps plus monthly"), Some("playstation.com"));
    }

    #[test]
    fn test_extract_literal_domains() {
        let directory = MerchantDirectory::new();
        assert_eq!(
            directory.extract_literal("sp booking.com sydney"),
            Some("booking.com".to_string())
        );
        assert_eq!(
            directory.extract_literal("shop.gov.au payment"),
            Some("shop.gov.au".to_string())
        );
        assert_eq!(
            directory.extract_literal("myshop.com.au order 42"),
            Some("myshop.com.au".to_string())
        );
        assert_eq!(directory.extract_literal("no domains here"), None);
    }

    #[test]
    fn test_tables_compile_and_are_nonempty() {
        let directory = MerchantDirectory::new();
        assert!(EXACT_DOMAINS.len() > 100);
        assert!(directory.fuzzy.len() > 30);
    }
}
