use crate::models::TrackerData;
use chrono::NaiveDate;

pub fn render_index(today: NaiveDate, data: &TrackerData) -> String {
    let profile = &data.profile;
    INDEX_HTML
        .replace("{{DATE}}", &today.format("%a, %b %-d").to_string())
        .replace("{{THEME}}", profile.selected_theme.as_str())
        .replace("{{XP}}", &profile.experience.to_string())
        .replace("{{COINS}}", &profile.coins.to_string())
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Habit Tracker</title>
  <style>
    :root {
      --accent: #6b5cff;
      --bg: linear-gradient(135deg, #f7faff, #fff7fb);
      --card: rgba(255, 255, 255, 0.75);
      --muted: #98a0b3;
      --ink: #0b1220;
    }

    body[data-theme="ocean"] { --accent: #2bb7f5; --bg: linear-gradient(135deg, #f1fbff, #eef9ff); }
    body[data-theme="sunset"] { --accent: #ff6b81; --bg: linear-gradient(135deg, #fff7f2, #fff1f8); }
    body[data-theme="midnight"] {
      --accent: #6b7bff;
      --bg: linear-gradient(135deg, #0f1724, #0b1220);
      --card: rgba(12, 16, 30, 0.6);
      --muted: #9aa6c7;
      --ink: #e6eef8;
    }

    * { box-sizing: border-box; }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Inter", "Segoe UI", sans-serif;
      display: grid;
      place-items: start center;
      padding: 32px 18px 48px;
    }

    .app { width: min(900px, 100%); display: grid; gap: 20px; }

    header { display: flex; justify-content: space-between; align-items: end; gap: 12px; flex-wrap: wrap; }
    h1 { margin: 0; font-size: 2rem; }
    .muted { color: var(--muted); }

    .panel {
      background: var(--card);
      border-radius: 20px;
      padding: 18px;
      display: flex;
      gap: 16px;
      flex-wrap: wrap;
      align-items: center;
    }

    .meter { flex: 1 1 160px; height: 10px; border-radius: 999px; background: rgba(0, 0, 0, 0.08); overflow: hidden; }
    .meter i { display: block; height: 100%; background: var(--accent); width: 0; }

    .chip {
      border: 1px solid var(--accent);
      border-radius: 999px;
      padding: 6px 12px;
      background: transparent;
      color: inherit;
      cursor: pointer;
    }
    .chip.active { background: var(--accent); color: white; }

    .list { display: grid; grid-template-columns: repeat(auto-fill, minmax(240px, 1fr)); gap: 14px; }

    .card { background: var(--card); border-radius: 18px; padding: 16px; display: grid; gap: 8px; }
    .card.completed-daily { opacity: 0.7; }
    .card .tag { font-size: 0.8rem; color: var(--muted); text-transform: uppercase; letter-spacing: 0.08em; }
    .progress { height: 8px; border-radius: 999px; background: rgba(0, 0, 0, 0.08); overflow: hidden; }
    .progress i { display: block; height: 100%; background: var(--accent); }

    button.action {
      border: none;
      border-radius: 999px;
      padding: 10px 16px;
      background: var(--accent);
      color: white;
      font-weight: 600;
      cursor: pointer;
    }
    button.action:disabled { opacity: 0.6; cursor: default; }

    form { display: flex; gap: 8px; flex-wrap: wrap; align-items: center; }
    input, select { border-radius: 10px; border: 1px solid var(--muted); padding: 8px 10px; }
    .error { color: #d93a4a; min-height: 1.2em; }

    .toasts { position: fixed; right: 18px; bottom: 18px; display: grid; gap: 8px; }
    .toast { background: var(--ink); color: white; padding: 10px 14px; border-radius: 12px; transition: opacity 300ms ease; }
    body[data-theme="midnight"] .toast { background: var(--accent); }
  </style>
</head>
<body data-theme="{{THEME}}">
  <main class="app">
    <header>
      <div>
        <h1>Habit Tracker</h1>
        <div class="muted">{{DATE}}</div>
      </div>
      <div>Best streak <strong id="bestStreak">0</strong> days</div>
    </header>

    <section class="panel">
      <div>XP <strong id="xp">{{XP}}</strong></div>
      <div class="meter"><i id="xpMeter"></i></div>
      <div>Coins <strong id="coins">{{COINS}}</strong></div>
      <button class="action" id="claimReward">Claim reward (30)</button>
      <select id="themeSelect">
        <option value="default">default</option>
        <option value="ocean">ocean</option>
        <option value="midnight">midnight</option>
        <option value="sunset">sunset</option>
      </select>
    </section>

    <section class="panel">
      <span>Mood <strong id="moodLabel">-</strong></span>
      <button class="chip" data-mood="1">1</button>
      <button class="chip" data-mood="2">2</button>
      <button class="chip" data-mood="3">3</button>
      <button class="chip" data-mood="4">4</button>
      <label><input type="checkbox" id="focus" /> Focus mode</label>
      <input id="search" placeholder="Search" />
      <button class="action" id="resetAll">Reset progress</button>
    </section>

    <section class="panel" id="filters">
      <button class="chip active" data-cat="All">All</button>
      <button class="chip" data-cat="Fitness">Fitness</button>
      <button class="chip" data-cat="Study">Study</button>
      <button class="chip" data-cat="Work">Work</button>
      <button class="chip" data-cat="Health">Health</button>
      <button class="chip" data-cat="Other">Other</button>
    </section>

    <section class="panel">
      <form id="habitForm">
        <input id="habitName" placeholder="New habit" />
        <select id="habitCategory">
          <option>Fitness</option><option>Study</option><option>Work</option>
          <option>Health</option><option selected>Other</option>
        </select>
        <input id="habitProgress" type="number" value="0" style="width: 80px" />
        <label><input type="checkbox" id="habitDaily" checked /> Daily</label>
        <button class="action" type="submit">Add</button>
        <button class="action" type="button" id="addDemo">Demo</button>
      </form>
      <div class="error" id="formError"></div>
    </section>

    <section class="list" id="habitList"></section>
  </main>
  <div class="toasts" id="toasts"></div>

  <script>
    const $ = (s) => document.querySelector(s);
    const $$ = (s) => Array.from(document.querySelectorAll(s));
    const moods = ['', 'frustrated', 'down', 'neutral', 'happy'];

    function toast(message, ms = 1400) {
      const el = document.createElement('div');
      el.className = 'toast';
      el.textContent = message;
      $('#toasts').appendChild(el);
      setTimeout(() => { el.style.opacity = '0'; setTimeout(() => el.remove(), 300); }, ms);
    }

    async function call(method, url, body) {
      const res = await fetch(url, {
        method,
        headers: { 'Content-Type': 'application/json' },
        body: body === undefined ? undefined : JSON.stringify(body),
      });
      if (!res.ok) {
        const message = await res.text();
        toast(message, 1800);
        throw new Error(message);
      }
      return res.json();
    }

    function render(state) {
      state.notices.forEach((n) => toast(n.message, n.duration_ms));
      $('#xp').textContent = state.experience;
      $('#coins').textContent = state.coins;
      $('#bestStreak').textContent = state.best_streak;
      $('#xpMeter').style.width = state.xp_meter + '%';
      $('#moodLabel').textContent = state.mood ? moods[state.mood] : '-';
      $$('[data-mood]').forEach((b) => b.classList.toggle('active', Number(b.dataset.mood) === state.mood));
      document.body.dataset.theme = state.selected_theme;
      $$('#themeSelect option').forEach((o) => {
        o.disabled = o.value !== 'default' && !state.unlocked_themes.includes(o.value);
      });
      $('#themeSelect').value = state.selected_theme;
      loadHabits();
    }

    async function loadHabits() {
      const params = new URLSearchParams({
        category: $('#filters .chip.active').dataset.cat,
        search: $('#search').value,
        focus: $('#focus').checked,
      });
      const habits = await call('GET', '/api/habits?' + params);
      const list = $('#habitList');
      list.innerHTML = '';
      if (habits.length === 0) {
        list.innerHTML = '<div class="card"><strong>No habits</strong><div class="muted">Try adding a habit or remove filters</div></div>';
        return;
      }
      habits.forEach((h) => {
        const card = document.createElement('div');
        card.className = 'card' + (h.isDaily && h.completedToday ? ' completed-daily' : '');
        const pct = h.completedToday ? 100 : h.progress;
        card.innerHTML = `
          <div class="tag"></div>
          <strong class="name"></strong>
          <small class="muted">${h.isDaily ? 'Streak: ' + h.streak : 'One-off task'}</small>
          <div class="progress"><i style="width:${pct}%"></i></div>
          <small class="muted">${pct}% complete</small>
          <div><button class="action done"></button> <button class="chip challenge">Challenge</button></div>`;
        card.querySelector('.tag').textContent = h.category + (h.isDaily ? ' / Daily' : '');
        card.querySelector('.name').textContent = h.name;
        const done = card.querySelector('.done');
        if (h.isDaily && h.completedToday) {
          done.textContent = 'Completed';
          done.disabled = true;
        } else {
          done.textContent = 'Done';
          done.onclick = () => call('POST', `/api/habits/${h.id}/done`).then((r) => render(r.state));
        }
        card.querySelector('.challenge').onclick = () => {
          const length = Number(prompt('Challenge length: 7, 21 or 30', '7'));
          call('POST', `/api/habits/${h.id}/challenge`, { length }).then((r) => render(r.state));
        };
        list.appendChild(card);
      });
    }

    $('#habitForm').addEventListener('submit', (e) => {
      e.preventDefault();
      $('#formError').textContent = '';
      call('POST', '/api/habits', {
        name: $('#habitName').value,
        category: $('#habitCategory').value,
        start_progress: Number($('#habitProgress').value) || 0,
        is_daily: $('#habitDaily').checked,
      })
        .then((r) => { $('#habitForm').reset(); render(r.state); })
        .catch((err) => { $('#formError').textContent = err.message; });
    });

    $('#addDemo').onclick = () => call('POST', '/api/habits/demo').then((r) => render(r.state));
    $('#claimReward').onclick = () => call('POST', '/api/rewards/claim', {}).then((r) => render(r.state));
    $('#themeSelect').onchange = (e) =>
      call('POST', '/api/theme', { theme: e.target.value })
        .then((r) => render(r.state))
        .catch(() => call('GET', '/api/state').then(render));
    $('#resetAll').onclick = () => {
      if (confirm('Reset all progress?')) call('POST', '/api/reset').then((r) => render(r.state));
    };
    $$('[data-mood]').forEach((b) => {
      b.onclick = () => call('POST', '/api/mood', { mood: Number(b.dataset.mood) }).then((r) => render(r.state));
    });
    $$('#filters .chip').forEach((chip) => {
      chip.onclick = () => {
        $$('#filters .chip').forEach((c) => c.classList.remove('active'));
        chip.classList.add('active');
        loadHabits();
      };
    });
    let searchTimer;
    $('#search').addEventListener('input', () => {
      clearTimeout(searchTimer);
      searchTimer = setTimeout(loadHabits, 180);
    });
    $('#focus').addEventListener('change', loadHabits);

    call('GET', '/api/state').then(render);
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Theme;

    #[test]
    fn index_carries_theme_and_counters() {
        let mut data = TrackerData::default();
        data.profile.selected_theme = Theme::Midnight;
        data.profile.coins = 12;
        let today = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();

        let html = render_index(today, &data);
        assert!(html.contains(r#"<body data-theme="midnight">"#));
        assert!(html.contains(r#"<strong id="coins">12</strong>"#));
        assert!(html.contains("Mon, Jan 5"));
        assert!(!html.contains("{{"));
    }
}
