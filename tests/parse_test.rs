use hiracli::parse::{extract_artists, extract_song, extract_song_links, last_page_number};
use url::Url;

fn base() -> Url {
    Url::parse("https://tononkira.serasera.org").unwrap()
}

#[test]
fn test_last_page_number_from_farany_link() {
    let html = r#"<html><body>
        <nav>
            <a href="/mpihira?page=2">2</a>
            <a aria-label="Farany" href="/mpihira?page=42">&raquo;&raquo;</a>
        </nav>
    </body></html>"#;

    assert_eq!(last_page_number(html, &base()), 42);
}

#[test]
fn test_last_page_number_defaults_to_one_without_control() {
    let html = "<html><body><p>no pagination here</p></body></html>";
    assert_eq!(last_page_number(html, &base()), 1);
}

#[test]
fn test_last_page_number_defaults_to_one_on_unparsable_target() {
    let html = r#"<html><body>
        <a aria-label="Farany" href="/mpihira?order=name">last</a>
    </body></html>"#;
    assert_eq!(last_page_number(html, &base()), 1);

    // A pathological page=0 target must never propagate
    let html = r#"<html><body>
        <a aria-label="Farany" href="/mpihira?page=0">last</a>
    </body></html>"#;
    assert_eq!(last_page_number(html, &base()), 1);
}

#[test]
fn test_extract_artists_with_counts() {
    let html = r#"<html><body>
        <a href="/mpihira/mahaleo">Mahaleo</a>
        <a href="/mpihira/mahaleo/hira">Misy hira 42</a>
        <a href="https://tononkira.serasera.org/mpihira/rossy">Rossy</a>
        <a href="/mpihira/rossy/hira">Misy hira 17</a>
    </body></html>"#;

    let artists = extract_artists(html, &base());

    assert_eq!(artists.len(), 2);
    assert_eq!(artists[0].name, "Mahaleo");
    assert_eq!(artists[0].slug, "mahaleo");
    assert_eq!(artists[0].song_count, 42);
    assert_eq!(artists[1].slug, "rossy");
    assert_eq!(artists[1].song_count, 17);
}

#[test]
fn test_extract_artists_defaults_count_to_zero() {
    let html = r#"<html><body>
        <a href="/mpihira/vazo">Vazo</a>
        <a href="/sokajy/ballades">Ballades</a>
    </body></html>"#;

    let artists = extract_artists(html, &base());

    assert_eq!(artists.len(), 1);
    assert_eq!(artists[0].slug, "vazo");
    assert_eq!(artists[0].song_count, 0);
}

#[test]
fn test_extract_artists_ignores_subpages_and_foreign_hosts() {
    let html = r#"<html><body>
        <a href="/mpihira/mahaleo/hira">Misy hira 42</a>
        <a href="/mpihira/mahaleo/ankafizo">Ankafizo</a>
        <a href="https://example.com/mpihira/fake">Fake</a>
        <a href="/mpihira/">empty</a>
    </body></html>"#;

    assert!(extract_artists(html, &base()).is_empty());
}

#[test]
fn test_extract_song_links_dedups_by_url() {
    let html = r#"<html><body>
        <a href="/hira/mahaleo/ry-tanindrazanay">Ry Tanindrazanay</a>
        <a href="/hira/mahaleo/ry-tanindrazanay">same song again</a>
        <a href="/hira/mahaleo/veloma">Veloma</a>
        <a href="/mpihira/mahaleo">Mahaleo</a>
    </body></html>"#;

    let links = extract_song_links(html, &base());

    assert_eq!(links.len(), 2);
    assert_eq!(links[0].slug, "ry-tanindrazanay");
    assert_eq!(
        links[0].url,
        "https://tononkira.serasera.org/hira/mahaleo/ry-tanindrazanay"
    );
    assert_eq!(links[1].slug, "veloma");
}

#[test]
fn test_extract_song_links_slug_from_single_segment() {
    let html = r#"<a href="/hira/lone">Lone</a>"#;
    let links = extract_song_links(html, &base());

    assert_eq!(links.len(), 1);
    assert_eq!(links[0].slug, "lone");
}

#[test]
fn test_extract_song_full_page() {
    let html = r#"<html>
    <head><title>Tsara - Tononkira</title></head>
    <body>
        <h2>Tsara (Mahaleo)</h2>
        <a href="/mpihira/mahaleo/hira">Hira</a>
        <a href="/mpihira/mahaleo">Mahaleo</a>
        <div class="print my-3 fst-italic">Nalaina tao amin'ny tononkira.serasera.org</div>
        Tsara ny andro
        <br>
        Tsara ny lanitra
        <br><br><br>
        Veloma ry havana
        <div class="comments">fanehoan-kevitra</div>
    </body></html>"#;

    let record = extract_song(html, &base()).expect("record should extract");

    assert_eq!(record.title, "Tsara");
    assert_eq!(record.artist, "Mahaleo");
    assert_eq!(
        record.lyrics,
        "Tsara ny andro\n\nTsara ny lanitra\n\nVeloma ry havana"
    );
}

#[test]
fn test_extract_song_title_falls_back_to_page_title() {
    let html = r#"<html>
    <head><title>Veloma - Tononkira</title></head>
    <body>
        <div class="print my-3 fst-italic">Nalaina tao amin'ny tononkira.serasera.org</div>
        Veloma ry havana malala
    </body></html>"#;

    let record = extract_song(html, &base()).expect("record should extract");
    assert_eq!(record.title, "Veloma");
    assert_eq!(record.artist, "");
}

#[test]
fn test_extract_song_uses_fallback_marker() {
    let html = r#"<html><body>
        <h1>Hira</h1>
        <div class="attribution">tononkira.serasera.org</div>
        Andininy voalohany
    </body></html>"#;

    let record = extract_song(html, &base()).expect("record should extract");
    assert_eq!(record.lyrics, "Andininy voalohany");
}

#[test]
fn test_extract_song_absent_without_marker() {
    let html = r#"<html><body>
        <h2>Tsara</h2>
        <p>no attribution block anywhere</p>
    </body></html>"#;

    assert!(extract_song(html, &base()).is_none());
}

#[test]
fn test_extract_song_absent_when_lyrics_empty() {
    let html = r#"<html><body>
        <h2>Tsara</h2>
        <div class="print my-3 fst-italic">Nalaina tao amin'ny tononkira.serasera.org</div>
        <div class="comments">boundary right away</div>
    </body></html>"#;

    assert!(extract_song(html, &base()).is_none());
}

#[test]
fn test_extract_song_stops_at_block_boundary() {
    let html = r#"<html><body>
        <h2>Tsara</h2>
        <div class="print my-3 fst-italic">Nalaina tao amin'ny tononkira.serasera.org</div>
        Andininy voalohany
        <h5>Midira</h5>
        Tokony tsy ho hita
    </body></html>"#;

    let record = extract_song(html, &base()).expect("record should extract");
    assert_eq!(record.lyrics, "Andininy voalohany");
}
