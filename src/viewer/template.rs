//! Self-contained viewer page
//!
//! `{{NAME}}` markers are filled by [`fill_template`] in a single pass, so
//! substituted text is never scanned for further markers.

/// Page skeleton: styles, controls and the frame-rendering script
pub const VIEWER_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{{TITLE}}</title>
<style>
* { margin: 0; padding: 0; box-sizing: border-box; }
body { font-family: Arial, sans-serif; background-color: #f5f5f5; padding: 20px; }
.container { max-width: 1400px; margin: 0 auto; background: #fff; padding: 20px; border-radius: 10px; box-shadow: 0 2px 10px rgba(0, 0, 0, 0.1); }
h1 { text-align: center; color: #333; margin-bottom: 10px; font-size: 18px; }
.version-info { text-align: center; color: #666; font-size: 12px; margin-bottom: 14px; }
.controls { background: #f8f9fa; padding: 12px; border-radius: 8px; margin-bottom: 14px; }
.control-row { display: flex; align-items: center; gap: 12px; flex-wrap: wrap; margin-top: 8px; }
.checkbox-label { display: flex; align-items: center; gap: 4px; font-size: 13px; cursor: pointer; }
.checkbox-label.disabled { color: #aaa; cursor: default; }
select, button { padding: 4px 10px; font-size: 13px; border: 1px solid #ccc; border-radius: 4px; background: #fff; cursor: pointer; }
button:hover:not(:disabled) { background: #e9ecef; }
select:disabled, button:disabled { color: #aaa; cursor: default; }
#frameSlider { flex: 1; min-width: 200px; }
#frameInfo { font-family: monospace; min-width: 90px; text-align: right; }
.info { font-size: 12px; color: #333; padding: 6px 8px; background: #e8f4fd; border-radius: 4px; }
.info.warning { background: #fff3cd; color: #856404; }
.legend-item { display: inline-block; margin-left: 6px; }
.legend-color { display: inline-block; padding: 0 4px; border-radius: 3px; font-family: monospace; }
.grid { display: grid; gap: 3px; margin-top: 10px; }
.cell { border: 1px solid #ddd; border-radius: 4px; background: #fafafa; min-height: 50px; overflow: hidden; }
.cell-header { font-size: 10px; color: #888; background: #eee; padding: 1px 4px; }
.cell-data { padding: 2px 4px; font-size: 11px; }
.peak { font-family: monospace; white-space: pre; margin: 1px 0; padding: 1px 3px; border-radius: 3px; }
.peak-high { background: #c8e6c9; color: #1b5e20; }
.peak-medium { background: #ffe0b2; color: #e65100; }
.peak-low { background: #ffcdd2; color: #b71c1c; }
.peak-none { color: #666; }
.aux { font-family: monospace; color: #666; background: #e0e0e0; margin: 1px 0; padding: 1px 3px; border-radius: 3px; }
.no-data { color: #aaa; font-style: italic; font-size: 11px; }
.histo-container { margin-top: 16px; }
.histo-grid { display: grid; gap: 3px; }
.histo-cell { border: 1px solid #ddd; border-radius: 4px; background: #fff; cursor: pointer; }
.histo-cell.empty { cursor: default; }
.histo-cell-header { font-size: 10px; color: #888; background: #eee; padding: 1px 4px; }
.histo-chart { display: flex; justify-content: center; padding: 2px; }
.modal { display: none; position: fixed; z-index: 10; left: 0; top: 0; width: 100%; height: 100%; background: rgba(0, 0, 0, 0.5); }
.modal.show { display: flex; align-items: center; justify-content: center; }
.modal-content { background: #fff; padding: 20px; border-radius: 10px; max-width: 90%; max-height: 90%; overflow: auto; position: relative; }
.modal-close { position: absolute; top: 8px; right: 14px; font-size: 26px; cursor: pointer; color: #888; }
.modal-title { font-size: 16px; margin-bottom: 10px; }
.peak-info { margin-top: 10px; font-size: 13px; font-family: monospace; }
.peak-info div { margin: 2px 0; padding: 2px 6px; border-radius: 3px; }
</style>
</head>
<body>
<div class="container">
  <h1>{{TITLE}}</h1>
  <div class="version-info" id="versionInfo">{{VERSION_TEXT}}</div>
  <div class="controls">
    <div class="info" id="frameDetails"></div>
    <div class="control-row">
      <label class="checkbox-label"><input type="checkbox" id="showNoise"> Noise</label>
      <label class="checkbox-label"><input type="checkbox" id="showXtalk"> XTalk</label>
      <label class="checkbox-label"><input type="checkbox" id="showPeaks"> Peaks</label>
      <select id="peaksToShow" title="Peaks to show">
        <option value="1">1</option>
        <option value="2">2</option>
        <option value="3">3</option>
        <option value="4">4</option>
      </select>
      <label class="checkbox-label"><input type="checkbox" id="showDistance"> Distance</label>
      <label class="checkbox-label"><input type="checkbox" id="showSnr"> SNR</label>
      <label class="checkbox-label"><input type="checkbox" id="showSignal"> Signal</label>
      <label class="checkbox-label"><input type="checkbox" id="showXyz"> XYZ</label>
      <label class="checkbox-label"><input type="checkbox" id="showHistogram" {{HISTO_DISABLED}}> Histogram</label>
      <select id="histoType" title="Histogram source" {{HISTO_DISABLED}}>
        <option value="mp">MP</option>
        <option value="ref">Ref</option>
      </select>
    </div>
    <div class="control-row">
      <button id="prevBtn">&#9664; Previous</button>
      <input type="range" id="frameSlider" min="0" max="{{FRAME_MAX}}" value="0" step="1">
      <button id="nextBtn">Next &#9654;</button>
      <span id="frameInfo">0 / {{FRAME_MAX}}</span>
    </div>
  </div>
  <div class="grid" id="dataGrid"></div>
  <div class="histo-container" id="histoContainer" style="display: none;">
    <div class="histo-grid" id="histoGrid"></div>
  </div>
</div>
<div class="modal" id="histoModal">
  <div class="modal-content">
    <span class="modal-close" id="modalClose">&times;</span>
    <div class="modal-title" id="modalTitle"></div>
    <div id="modalChart"></div>
    <div class="peak-info" id="modalPeaks"></div>
  </div>
</div>
<script type="application/json" id="log-data">{{PAYLOAD}}</script>
<script>
(function () {
  'use strict';

  const payload = JSON.parse(document.getElementById('log-data').textContent);
  const frames = payload.frames;
  const config = payload.configuration || {};
  const thresholds = payload.thresholds;
  const classes = payload.classes;
  const histogramColors = payload.histogramColors;
  const options = payload.options;
  const toggles = ['showNoise', 'showXtalk', 'showPeaks', 'showDistance', 'showSnr', 'showSignal', 'showXyz', 'showHistogram'];
  const peakFields = ['showDistance', 'showSnr', 'showSignal', 'showXyz'];
  let current = 0;
  let available = payload.initialHistogram;

  function esc(value) {
    return String(value)
      .replace(/&/g, '&amp;')
      .replace(/</g, '&lt;')
      .replace(/>/g, '&gt;')
      .replace(/"/g, '&quot;');
  }

  function orNA(value) {
    return value === undefined || value === null || value === '' ? 'N/A' : value;
  }

  function hasBins(record) {
    return !!record && Array.isArray(record.bin) && record.bin.length > 0;
  }

  function histogramAvailability(frame) {
    if (!frame) return null;
    if (Array.isArray(frame.mp_histo)) {
      for (const row of frame.mp_histo) {
        if (Array.isArray(row) && row.some(hasBins)) return 'mp';
      }
    }
    if (Array.isArray(frame.ref_histo) && frame.ref_histo.some(hasBins)) return 'ref';
    return null;
  }

  function histogramBins(frame, kind, row, col) {
    let record = null;
    if (kind === 'mp' && Array.isArray(frame.mp_histo)) {
      const cells = frame.mp_histo[row];
      record = Array.isArray(cells) ? cells[col] : null;
    } else if (kind === 'ref' && Array.isArray(frame.ref_histo)) {
      record = frame.ref_histo[row];
    }
    return hasBins(record) ? record.bin.map(Number) : [];
  }

  function confidenceClass(snr) {
    const value = Number(snr);
    if (value > thresholds.high) return classes.high;
    if (value > thresholds.medium) return classes.medium;
    if (value > 0) return classes.low;
    return classes.none;
  }

  function peakField(prefix, number, text) {
    const padding = Math.max(0, thresholds.fieldWidth - text.length);
    return prefix + number + ':' + ' '.repeat(padding) + text;
  }

  function resolution(frame) {
    if (!frame || !Array.isArray(frame.results) || frame.results.length === 0) return null;
    const first = frame.results[0];
    return { rows: frame.results.length, cols: Array.isArray(first) ? first.length : 0 };
  }

  function renderDetails(frame) {
    const details = document.getElementById('frameDetails');
    const res = resolution(frame);
    const resText = res ? res.cols + 'x' + res.rows : 'N/A';
    const legend =
      '<span class="legend-item"><span class="legend-color ' + classes.high + '">c&gt;' + thresholds.high + '</span></span>' +
      '<span class="legend-item"><span class="legend-color ' + classes.medium + '">c&gt;' + thresholds.medium + '</span></span>' +
      '<span class="legend-item"><span class="legend-color ' + classes.low + '">c&gt;0</span></span>';
    if (!frame || !frame.info || typeof frame.info !== 'object') {
      details.classList.remove('warning');
      details.innerHTML = 'Res: ' + resText + ' | Frame info not available | ' + legend;
      return;
    }
    const info = frame.info;
    const warn = Number(info.warnings) > 0;
    const readTime = info.read_time !== undefined ? info.read_time : info.systick_t0;
    const parts = [
      'Frame: ' + esc(orNA(info.frame_number)),
      'Res: ' + resText,
      'Iterations: ' + esc(orNA(config.iterations)) + 'k',
      'HA_Iterations: ' + esc(orNA(config.high_accuracy_iterations)) + 'k',
      'Period: ' + esc(orNA(config.period)) + 'ms',
      'Conf Thresh: ' + esc(orNA(config.confidence_threshold)),
      'Temp: ' + esc(orNA(info.temperature)) + '&deg;C',
      'ReadTime: ' + esc(orNA(readTime)),
    ];
    details.classList.toggle('warning', warn);
    details.innerHTML = (warn ? '&#9888; Warnings: ' + esc(info.warnings) + ' | ' : '') + parts.join(' | ') + ' | ' + legend;
  }

  function renderCell(cell) {
    const blocks = [];
    if (options.showNoise && 'noise' in cell) {
      blocks.push('<div class="aux">noise:' + esc(cell.noise) + '</div>');
    }
    if (options.showPeaks && Array.isArray(cell.peaks)) {
      cell.peaks.slice(0, options.peaksToShow).forEach(function (peak, i) {
        if (!peak || typeof peak !== 'object') return;
        const n = i + 1;
        const lines = [];
        if (options.showDistance) lines.push(peakField('d', n, String(orNA(peak.distance))));
        if (options.showSnr) lines.push(peakField('c', n, String(orNA(peak.snr))));
        if (options.showSignal) lines.push(peakField('s', n, String(orNA(peak.signal))));
        if (options.showXyz) {
          ['x', 'y', 'z'].forEach(function (axis) {
            const value = Number(peak[axis]);
            lines.push(peakField(axis, n, Number.isFinite(value) ? value.toFixed(1) : 'N/A'));
          });
        }
        if (lines.length > 0) {
          blocks.push('<div class="peak ' + confidenceClass(peak.snr) + '">' + lines.map(esc).join('\n') + '</div>');
        }
      });
    }
    if (options.showXtalk && 'xtalk' in cell) {
      blocks.push('<div class="aux">xtalk:' + esc(cell.xtalk) + '</div>');
    }
    return blocks.length > 0 ? blocks.join('') : '<div class="no-data">No data</div>';
  }

  function renderGrid(frame) {
    const grid = document.getElementById('dataGrid');
    const res = resolution(frame);
    if (!res) {
      grid.style.gridTemplateColumns = '1fr';
      grid.innerHTML = '<div class="no-data">No results in this frame</div>';
      return;
    }
    grid.style.gridTemplateColumns = 'repeat(' + res.cols + ', 1fr)';
    const html = [];
    for (let row = 0; row < res.rows; row++) {
      const cells = frame.results[row];
      for (let col = 0; col < res.cols; col++) {
        const cell = Array.isArray(cells) ? cells[col] : undefined;
        const body = cell && typeof cell === 'object' ? renderCell(cell) : '<div class="no-data">No data</div>';
        html.push('<div class="cell"><div class="cell-header">(' + col + ',' + row + ')</div><div class="cell-data">' + body + '</div></div>');
      }
    }
    grid.innerHTML = html.join('');
  }

  function histogramSvg(bins, width, height, color, detailed) {
    const margin = detailed ? { top: 30, right: 20, bottom: 45, left: 60 } : { top: 2, right: 2, bottom: 2, left: 2 };
    const plotW = width - margin.left - margin.right;
    const plotH = height - margin.top - margin.bottom;
    const maxValue = Math.max(0, ...bins.filter(Number.isFinite));
    const barW = plotW / Math.max(1, bins.length);
    const parts = ['<svg width="' + width + '" height="' + height + '" xmlns="http://www.w3.org/2000/svg">'];
    parts.push('<g transform="translate(' + margin.left + ',' + margin.top + ')">');
    bins.forEach(function (value, i) {
      const h = maxValue > 0 && Number.isFinite(value) ? Math.max(0, (value / maxValue) * plotH) : 0;
      parts.push('<rect x="' + (i * barW).toFixed(2) + '" y="' + (plotH - h).toFixed(2) + '" width="' + Math.max(0.5, barW - 0.5).toFixed(2) + '" height="' + h.toFixed(2) + '" fill="' + color + '"/>');
    });
    if (detailed) {
      parts.push('<line x1="0" y1="' + plotH + '" x2="' + plotW + '" y2="' + plotH + '" stroke="#333"/>');
      parts.push('<line x1="0" y1="0" x2="0" y2="' + plotH + '" stroke="#333"/>');
      const yTicks = 5;
      for (let t = 0; t <= yTicks; t++) {
        const value = (maxValue * t) / yTicks;
        const y = plotH - (plotH * t) / yTicks;
        parts.push('<line x1="-5" y1="' + y + '" x2="0" y2="' + y + '" stroke="#333"/>');
        parts.push('<text x="-8" y="' + (y + 4) + '" font-size="11" text-anchor="end">' + Math.round(value) + '</text>');
      }
      const xStep = Math.max(1, Math.ceil(bins.length / 16));
      for (let i = 0; i < bins.length; i += xStep) {
        const x = i * barW + barW / 2;
        parts.push('<line x1="' + x + '" y1="' + plotH + '" x2="' + x + '" y2="' + (plotH + 5) + '" stroke="#333"/>');
        parts.push('<text x="' + x + '" y="' + (plotH + 18) + '" font-size="11" text-anchor="middle">' + i + '</text>');
      }
      parts.push('<text x="' + plotW / 2 + '" y="' + (plotH + 38) + '" font-size="12" text-anchor="middle">Bin</text>');
      parts.push('<text transform="rotate(-90)" x="' + -plotH / 2 + '" y="-45" font-size="12" text-anchor="middle">Count</text>');
      if (maxValue > 0) {
        const maxIndex = bins.indexOf(maxValue);
        const x = maxIndex * barW + barW / 2;
        parts.push('<text x="' + x + '" y="-8" font-size="11" fill="#d32f2f" text-anchor="middle">max ' + maxValue + ' @ bin ' + maxIndex + '</text>');
      }
    }
    parts.push('</g></svg>');
    return parts.join('');
  }

  function renderHistograms(frame) {
    const container = document.getElementById('histoContainer');
    const histoGrid = document.getElementById('histoGrid');
    const res = resolution(frame);
    if (!options.showHistogram || available === null || !res) {
      container.style.display = 'none';
      return;
    }
    container.style.display = 'block';
    const kind = options.histoType;
    const color = histogramColors[kind];
    histoGrid.style.gridTemplateColumns = 'repeat(' + res.cols + ', 1fr)';
    histoGrid.innerHTML = '';
    for (let row = 0; row < res.rows; row++) {
      for (let col = 0; col < res.cols; col++) {
        const bins = histogramBins(frame, kind, row, col);
        const cell = document.createElement('div');
        cell.className = bins.length > 0 ? 'histo-cell' : 'histo-cell empty';
        const chart = bins.length > 0 ? histogramSvg(bins, 120, 60, color, false) : '<div class="no-data">No data</div>';
        cell.innerHTML = '<div class="histo-cell-header">(' + col + ',' + row + ')</div><div class="histo-chart">' + chart + '</div>';
        if (bins.length > 0) {
          cell.addEventListener('click', function () { openModal(frame, kind, row, col, bins, color); });
        }
        histoGrid.appendChild(cell);
      }
    }
  }

  function openModal(frame, kind, row, col, bins, color) {
    document.getElementById('modalTitle').textContent =
      (kind === 'ref' ? 'Ref' : 'MP') + ' histogram, pixel (' + col + ',' + row + '), frame ' + current;
    document.getElementById('modalChart').innerHTML = histogramSvg(bins, 800, 420, color, true);
    const results = Array.isArray(frame.results) ? frame.results[row] : null;
    const cell = Array.isArray(results) ? results[col] : null;
    const peaks = cell && Array.isArray(cell.peaks) ? cell.peaks : [];
    const lines = peaks
      .filter(function (peak) { return peak && typeof peak === 'object'; })
      .map(function (peak, i) {
        return '<div class="' + confidenceClass(peak.snr) + '">Peak ' + (i + 1) +
          ': distance ' + esc(orNA(peak.distance)) + ', snr ' + esc(orNA(peak.snr)) +
          ', signal ' + esc(orNA(peak.signal)) + '</div>';
      });
    document.getElementById('modalPeaks').innerHTML = lines.length > 0 ? lines.join('') : '<div class="no-data">No peaks</div>';
    document.getElementById('histoModal').classList.add('show');
  }

  function closeModal() {
    document.getElementById('histoModal').classList.remove('show');
  }

  function syncControls() {
    const histoDisabled = available === null;
    document.getElementById('showHistogram').disabled = histoDisabled;
    document.getElementById('histoType').disabled = histoDisabled;
    const peaksDisabled = !options.showPeaks;
    peakFields.forEach(function (id) { document.getElementById(id).disabled = peaksDisabled; });
    document.getElementById('peaksToShow').disabled = peaksDisabled;
  }

  function update() {
    const last = Math.max(0, frames.length - 1);
    document.getElementById('frameSlider').value = current;
    document.getElementById('frameInfo').textContent = current + ' / ' + last;
    document.getElementById('prevBtn').disabled = current <= 0;
    document.getElementById('nextBtn').disabled = current >= last;
    const frame = frames[current];
    available = histogramAvailability(frame);
    syncControls();
    renderDetails(frame);
    renderGrid(frame);
    renderHistograms(frame);
  }

  function goTo(index) {
    const last = Math.max(0, frames.length - 1);
    current = Math.min(last, Math.max(0, index));
    update();
  }

  toggles.forEach(function (id) {
    const input = document.getElementById(id);
    input.checked = !!options[id];
    input.addEventListener('change', function () {
      options[id] = input.checked;
      update();
    });
  });
  const peaksSelect = document.getElementById('peaksToShow');
  peaksSelect.value = String(options.peaksToShow);
  peaksSelect.addEventListener('change', function () {
    options.peaksToShow = parseInt(peaksSelect.value, 10);
    update();
  });
  const histoSelect = document.getElementById('histoType');
  histoSelect.value = options.histoType;
  histoSelect.addEventListener('change', function () {
    options.histoType = histoSelect.value;
    update();
  });
  document.getElementById('frameSlider').addEventListener('input', function (e) { goTo(parseInt(e.target.value, 10)); });
  document.getElementById('prevBtn').addEventListener('click', function () { goTo(current - 1); });
  document.getElementById('nextBtn').addEventListener('click', function () { goTo(current + 1); });
  document.getElementById('modalClose').addEventListener('click', closeModal);
  document.getElementById('histoModal').addEventListener('click', function (e) {
    if (e.target === e.currentTarget) closeModal();
  });
  document.addEventListener('keydown', function (e) {
    if (e.key === 'Escape') { closeModal(); return; }
    if (e.target && e.target.tagName === 'SELECT') return;
    if (e.key === 'ArrowLeft') goTo(current - 1);
    else if (e.key === 'ArrowRight') goTo(current + 1);
    else if (e.key === 'Home') goTo(0);
    else if (e.key === 'End') goTo(frames.length - 1);
    else return;
    e.preventDefault();
  });

  update();
})();
</script>
</body>
</html>
"##;

/// Replace every `{{NAME}}` marker with its value from `values`.
///
/// Unknown markers are left in place.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let extra: usize = values.iter().map(|(_, v)| v.len()).sum();
    let mut out = String::with_capacity(template.len() + extra);
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let name = &after[..end];
                match values.iter().find(|(key, _)| *key == name) {
                    Some((_, value)) => out.push_str(value),
                    None => {
                        out.push_str("{{");
                        out.push_str(name);
                        out.push_str("}}");
                    }
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}
